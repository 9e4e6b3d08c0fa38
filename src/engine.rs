//! The matching state machine (§4.1). `accept_order` is the engine's
//! only public operation; everything else here is plumbing to run it in
//! a steady-state loop against the command ring.
#![allow(dead_code)]

use crate::book::Book;
use crate::config::EngineCfg;
use crate::events::EventSink;
use crate::pool::{LevelPool, OrderPool};
use crate::queue::CommandRing;
use crate::types::{OrderId, Price, Qty, Side};

pub struct Engine {
    cfg: EngineCfg,
    orders: OrderPool,
    levels: LevelPool,
    book: Book,
}

impl Engine {
    pub fn new(cfg: EngineCfg) -> Self {
        cfg.validate().expect("invalid EngineCfg");
        Self {
            orders: OrderPool::with_capacity(cfg.order_pool_capacity),
            levels: LevelPool::with_capacity(cfg.level_pool_capacity),
            book: Book::new(cfg.level_pool_capacity),
            cfg,
        }
    }

    #[inline]
    pub fn cfg(&self) -> &EngineCfg {
        &self.cfg
    }

    /// Crossing-the-spread, exactly as §4.1 describes it: match against
    /// the opposite side first, then rest any residual. Pre: `qty > 0`,
    /// `price > 0` — the gateway validates this upstream; violating it
    /// here is a programming error, not a recoverable input.
    pub fn accept_order(
        &mut self,
        id: OrderId,
        price: Price,
        qty: Qty,
        side: Side,
        sink: &mut dyn EventSink,
    ) {
        debug_assert!(qty > 0, "qty <= 0 must be rejected upstream");
        debug_assert!(price > 0, "price <= 0 must be rejected upstream");

        let remaining =
            self.book.match_incoming(&mut self.orders, &mut self.levels, id, price, qty, side, sink);

        if remaining > 0 {
            self.book.add_order(&mut self.orders, &mut self.levels, id, price, remaining, side);
            sink.on_accepted(id, price, remaining, side);
            tracing::debug!(order_id = id, price, qty = remaining, side = ?side, "order rested");
        } else {
            tracing::debug!(order_id = id, "order fully filled on entry, no accept emitted");
        }
    }

    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.book.best_bid(&self.levels)
    }

    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.book.best_ask(&self.levels)
    }

    /// Checks red-black invariants and map/tree lockstep on both sides
    /// of the book (§3 invariant 1, §8 P5). For tests; not called on the
    /// hot path.
    #[inline]
    pub fn check_book_consistency(&self) -> Result<(), &'static str> {
        self.book.check_consistency(&self.levels)
    }

    #[inline]
    pub fn order_pool_available(&self) -> u32 {
        self.orders.available()
    }

    #[inline]
    pub fn order_pool_capacity(&self) -> u32 {
        self.orders.capacity()
    }

    #[inline]
    pub fn level_pool_available(&self) -> u32 {
        self.levels.available()
    }

    #[inline]
    pub fn level_pool_capacity(&self) -> u32 {
        self.levels.capacity()
    }

    /// The matching thread's steady-state loop (§5): busy-spin on the
    /// ring, run one step to completion per command, never block, never
    /// return under normal operation.
    pub fn run(&mut self, ring: &CommandRing, sink: &mut dyn EventSink) -> ! {
        loop {
            let cmd = ring.pop_spin();
            self.accept_order(cmd.order_id, cmd.price, cmd.qty, cmd.side, sink);
        }
    }
}
