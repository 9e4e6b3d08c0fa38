//! Two-sided hybrid order book (§4.2): each side pairs a price→level hash
//! index with a red-black tree for O(log N) best-price navigation. Both
//! structures stay in lockstep — every level present in one is present in
//! the other, checked by `rbtree`'s invariant pass and exercised in the
//! property tests.
#![allow(dead_code)]

use crate::events::EventSink;
use crate::pool::{LevelPool, OrderPool};
use crate::price_index::PriceIndex;
use crate::rbtree::RbTree;
use crate::types::{H_NONE, LevelHandle, OrderHandle, OrderId, Price, Qty, Side};

/// One side's hybrid container: a tree for price ordering, a hash index
/// for O(1) membership lookup from `add_order`. A level present in one is
/// always present in the other (§3 invariant 1).
struct Ladder {
    tree: RbTree,
    index: PriceIndex,
}

impl Ladder {
    fn new(level_capacity: u32) -> Self {
        Self { tree: RbTree::new(), index: PriceIndex::with_capacity(level_capacity) }
    }

    /// Finds the level at `price`, creating (and borrowing from `levels`)
    /// it on first use.
    fn ensure_level(&mut self, levels: &mut LevelPool, price: Price) -> LevelHandle {
        if let Some(h) = self.index.get(price) {
            return h;
        }
        let h = levels.borrow().expect("level pool exhausted: capacity must cover peak open price-level count");
        levels.get_mut(h).price = price;
        self.tree.insert(levels, h);
        self.index
            .insert(price, h)
            .expect("price index exhausted: level pool capacity and index capacity must match");
        h
    }

    /// Removes an emptied level from both structures and returns it to the pool.
    fn remove_level(&mut self, levels: &mut LevelPool, price: Price, h: LevelHandle) {
        self.tree.remove(levels, h);
        self.index.remove(price);
        levels.release(h);
    }

    #[inline]
    fn best(&self, levels: &LevelPool, minimum: bool) -> Option<LevelHandle> {
        self.tree.best(levels, minimum)
    }

    /// Checks the red-black invariants and that the tree's price set
    /// agrees exactly with the index's (§3 invariant 1, §8 P5). Test/debug
    /// use only.
    fn check_consistency(&self, levels: &LevelPool) -> Result<(), &'static str> {
        self.tree.check_invariants(levels)?;

        let tree_prices: Vec<Price> = self.tree.in_order(levels).into_iter().map(|(p, _)| p).collect();
        if tree_prices.windows(2).any(|w| w[0] >= w[1]) {
            return Err("tree in-order prices not strictly increasing");
        }

        let mut index_prices = self.index.keys();
        index_prices.sort_unstable();
        if tree_prices != index_prices {
            return Err("tree price set disagrees with index price set");
        }
        Ok(())
    }
}

pub struct Book {
    bids: Ladder,
    asks: Ladder,
}

impl Book {
    pub fn new(level_capacity: u32) -> Self {
        Self { bids: Ladder::new(level_capacity), asks: Ladder::new(level_capacity) }
    }

    #[inline]
    fn ladder(&self, side: Side) -> &Ladder {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline]
    fn ladder_mut(&mut self, side: Side) -> &mut Ladder {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    pub fn best_bid(&self, levels: &LevelPool) -> Option<Price> {
        self.bids.best(levels, false).map(|h| levels.get(h).price)
    }

    pub fn best_ask(&self, levels: &LevelPool) -> Option<Price> {
        self.asks.best(levels, true).map(|h| levels.get(h).price)
    }

    /// Checks both sides' red-black invariants and map/tree lockstep
    /// (§3 invariant 1, §8 P5). Exposed for property tests; not on the
    /// hot path.
    pub fn check_consistency(&self, levels: &LevelPool) -> Result<(), &'static str> {
        self.bids.check_consistency(levels)?;
        self.asks.check_consistency(levels)?;
        Ok(())
    }

    /// Appends a resting order at `price` on `side` (§4.4 `add_order`),
    /// creating the level if this is the first order at that price.
    /// Pre: `qty > 0`.
    pub fn add_order(
        &mut self,
        orders: &mut OrderPool,
        levels: &mut LevelPool,
        id: OrderId,
        price: Price,
        qty: Qty,
        side: Side,
    ) -> OrderHandle {
        debug_assert!(qty > 0);
        let level_h = self.ladder_mut(side).ensure_level(levels, price);
        let order_h = orders.borrow().expect("order pool exhausted: capacity must cover peak open-order count");
        {
            let o = orders.get_mut(order_h);
            o.id = id;
            o.side = side;
            o.price = price;
            o.qty_open = qty;
            o.prev = H_NONE;
            o.next = H_NONE;
        }

        let tail = levels.get(level_h).tail;
        if tail == H_NONE {
            let lvl = levels.get_mut(level_h);
            lvl.head = order_h;
            lvl.tail = order_h;
        } else {
            orders.get_mut(tail).next = order_h;
            orders.get_mut(order_h).prev = tail;
            levels.get_mut(level_h).tail = order_h;
        }
        levels.get_mut(level_h).total_qty += qty;
        order_h
    }

    /// Executes the crossing-the-spread loop of §4.1 against the opposite
    /// side and returns the unfilled remainder. `sink` receives two
    /// `on_trade` calls per fill slice, passive first then aggressor,
    /// exactly in that order.
    pub fn match_incoming(
        &mut self,
        orders: &mut OrderPool,
        levels: &mut LevelPool,
        incoming_id: OrderId,
        price: Price,
        qty: Qty,
        side: Side,
        sink: &mut dyn EventSink,
    ) -> Qty {
        let minimum = side == Side::Buy; // BUY crosses up from best ask (the minimum)
        let opposite = match side {
            Side::Buy => &mut self.asks,
            Side::Sell => &mut self.bids,
        };

        let mut remaining = qty;
        loop {
            if remaining == 0 {
                break;
            }
            let Some(level_h) = opposite.best(levels, minimum) else { break };
            let level_price = levels.get(level_h).price;
            let crosses = match side {
                Side::Buy => price >= level_price,
                Side::Sell => price <= level_price,
            };
            if !crosses {
                break;
            }
            remaining = Self::match_level(
                opposite, orders, levels, level_h, level_price, remaining, incoming_id, side, sink,
            );
        }
        remaining
    }

    /// Walks one level's FIFO from `head`, per §4.1 `match_level`.
    fn match_level(
        opposite: &mut Ladder,
        orders: &mut OrderPool,
        levels: &mut LevelPool,
        level_h: LevelHandle,
        level_price: Price,
        mut remaining: Qty,
        incoming_id: OrderId,
        incoming_side: Side,
        sink: &mut dyn EventSink,
    ) -> Qty {
        while remaining > 0 {
            let head_h = levels.get(level_h).head;
            if head_h == H_NONE {
                break;
            }
            let (head_id, head_side, head_qty) = {
                let o = orders.get(head_h);
                (o.id, o.side, o.qty_open)
            };
            let trade_qty = remaining.min(head_qty);

            // maker fill, then taker fill — canonical order, never reversed.
            sink.on_trade(head_id, level_price, trade_qty, head_side);
            sink.on_trade(incoming_id, level_price, trade_qty, incoming_side);

            orders.get_mut(head_h).qty_open -= trade_qty;
            levels.get_mut(level_h).total_qty -= trade_qty;
            remaining -= trade_qty;

            if orders.get(head_h).qty_open == 0 {
                let next = orders.get(head_h).next;
                if next != H_NONE {
                    orders.get_mut(next).prev = H_NONE;
                }
                levels.get_mut(level_h).head = next;
                if next == H_NONE {
                    levels.get_mut(level_h).tail = H_NONE;
                }
                orders.release(head_h);
            }
        }

        if levels.get(level_h).head == H_NONE {
            opposite.remove_level(levels, level_price, level_h);
        }
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;

    fn pools() -> (OrderPool, LevelPool) {
        (OrderPool::with_capacity(64), LevelPool::with_capacity(16))
    }

    #[test]
    fn add_order_creates_level_and_updates_best() {
        let (mut orders, mut levels) = pools();
        let mut book = Book::new(16);

        book.add_order(&mut orders, &mut levels, 1, 100, 10, Side::Buy);
        assert_eq!(book.best_bid(&levels), Some(100));

        book.add_order(&mut orders, &mut levels, 2, 105, 4, Side::Buy);
        assert_eq!(book.best_bid(&levels), Some(105));

        book.add_order(&mut orders, &mut levels, 3, 110, 3, Side::Sell);
        assert_eq!(book.best_ask(&levels), Some(110));
    }

    #[test]
    fn immediate_full_fill_empties_level() {
        let (mut orders, mut levels) = pools();
        let mut book = Book::new(16);
        let mut sink = NullSink;

        book.add_order(&mut orders, &mut levels, 1, 100, 10, Side::Sell);
        let remaining =
            book.match_incoming(&mut orders, &mut levels, 2, 100, 10, Side::Buy, &mut sink);
        assert_eq!(remaining, 0);
        assert_eq!(book.best_ask(&levels), None);
    }

    #[test]
    fn partial_fill_leaves_residual_on_passive_level() {
        let (mut orders, mut levels) = pools();
        let mut book = Book::new(16);
        let mut sink = NullSink;

        book.add_order(&mut orders, &mut levels, 1, 100, 10, Side::Sell);
        let remaining =
            book.match_incoming(&mut orders, &mut levels, 2, 100, 15, Side::Buy, &mut sink);
        assert_eq!(remaining, 5);
        assert_eq!(book.best_ask(&levels), None);
    }

    #[test]
    fn strict_inequality_does_not_cross() {
        let (mut orders, mut levels) = pools();
        let mut book = Book::new(16);
        let mut sink = NullSink;

        book.add_order(&mut orders, &mut levels, 1, 100, 10, Side::Sell);
        let remaining =
            book.match_incoming(&mut orders, &mut levels, 2, 99, 10, Side::Buy, &mut sink);
        assert_eq!(remaining, 10, "buy limit below best ask must not cross");
        assert_eq!(book.best_ask(&levels), Some(100));
    }

    #[test]
    fn walks_multiple_levels_in_price_order() {
        let (mut orders, mut levels) = pools();
        let mut book = Book::new(16);
        let mut sink = NullSink;

        book.add_order(&mut orders, &mut levels, 1, 99, 10, Side::Sell);
        book.add_order(&mut orders, &mut levels, 2, 100, 10, Side::Sell);
        book.add_order(&mut orders, &mut levels, 3, 101, 10, Side::Sell);

        let remaining =
            book.match_incoming(&mut orders, &mut levels, 4, 100, 25, Side::Buy, &mut sink);
        assert_eq!(remaining, 5);
        assert_eq!(book.best_ask(&levels), Some(101));
    }
}
