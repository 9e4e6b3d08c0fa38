//! Fixed-capacity object pools (§4.5). Single-threaded LIFO-over-array;
//! no synchronization because only the matching thread ever touches a pool.
#![allow(dead_code)]

use crate::types::{H_NONE, L_NONE, LevelHandle, OrderHandle, OrderId, Price, Qty, Side};

/// A resting order: hot fields touched every match step, plus the
/// intrusive FIFO pointers that thread it through its `PriceLevel`.
#[derive(Clone, Copy)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub qty_open: Qty,

    // intrusive FIFO linkage (owned by whichever PriceLevel holds this order)
    pub prev: OrderHandle,
    pub next: OrderHandle,
}

impl Default for Order {
    fn default() -> Self {
        Self { id: 0, side: Side::Buy, price: 0, qty_open: 0, prev: H_NONE, next: H_NONE }
    }
}

/// A price level: FIFO head/tail + running quantity, plus the intrusive
/// red-black tree linkage that lets the level live directly in the side's
/// tree without a separate node wrapper.
#[derive(Clone, Copy)]
pub struct PriceLevel {
    pub price: Price,
    pub head: OrderHandle,
    pub tail: OrderHandle,
    pub total_qty: Qty,

    // intrusive red-black tree linkage
    pub left: LevelHandle,
    pub right: LevelHandle,
    pub parent: LevelHandle,
    pub red: bool,
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self {
            price: 0,
            head: H_NONE,
            tail: H_NONE,
            total_qty: 0,
            left: L_NONE,
            right: L_NONE,
            parent: L_NONE,
            red: true,
        }
    }
}

/// Capacity error: pool exhaustion is a fatal, capacity-planning bug
/// (§7.2), never a recoverable condition on the matching hot path.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("pool exhausted: {0} at capacity")]
pub struct PoolExhausted(pub &'static str);

macro_rules! define_pool {
    ($name:ident, $item:ty, $label:expr) => {
        pub struct $name {
            buf: Box<[$item]>,
            free: Vec<u32>,
            used: Vec<bool>,
        }

        impl $name {
            pub fn with_capacity(capacity: u32) -> Self {
                assert!(capacity > 0, "pool capacity must be > 0");
                let cap = capacity as usize;
                let mut free = Vec::with_capacity(cap);
                for i in (0..cap).rev() {
                    free.push(i as u32);
                }
                Self { buf: vec![<$item>::default(); cap].into_boxed_slice(), free, used: vec![false; cap] }
            }

            #[inline]
            pub fn capacity(&self) -> u32 {
                self.buf.len() as u32
            }

            #[inline]
            pub fn available(&self) -> u32 {
                self.free.len() as u32
            }

            /// Borrow a cleared instance. Fatal (not `Result`) on exhaustion:
            /// the caller is expected to size capacity from peak observed
            /// load, per §7.2.
            #[inline]
            pub fn borrow(&mut self) -> Result<u32, PoolExhausted> {
                let idx = self.free.pop().ok_or(PoolExhausted($label))?;
                debug_assert!(!self.used[idx as usize], "borrowing an in-use slot");
                self.used[idx as usize] = true;
                self.buf[idx as usize] = <$item>::default();
                Ok(idx)
            }

            /// Reset and return a slot to the pool.
            #[inline]
            pub fn release(&mut self, idx: u32) {
                let i = idx as usize;
                assert!(i < self.buf.len(), "index out of range");
                assert!(self.used[i], "double release detected");
                self.used[i] = false;
                self.buf[i] = <$item>::default();
                self.free.push(idx);
            }

            #[inline]
            pub fn get(&self, idx: u32) -> &$item {
                let i = idx as usize;
                debug_assert!(self.used[i], "get: slot not in use");
                &self.buf[i]
            }

            #[inline]
            pub fn get_mut(&mut self, idx: u32) -> &mut $item {
                let i = idx as usize;
                debug_assert!(self.used[i], "get_mut: slot not in use");
                &mut self.buf[i]
            }
        }
    };
}

define_pool!(OrderArena, Order, "order pool");
define_pool!(LevelArena, PriceLevel, "level pool");

/// The order object pool: `borrow`/`release` work in terms of `OrderHandle`.
pub struct OrderPool(OrderArena);

impl OrderPool {
    pub fn with_capacity(capacity: u32) -> Self {
        Self(OrderArena::with_capacity(capacity))
    }
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.0.capacity()
    }
    #[inline]
    pub fn available(&self) -> u32 {
        self.0.available()
    }
    #[inline]
    pub fn borrow(&mut self) -> Result<OrderHandle, PoolExhausted> {
        self.0.borrow().map(OrderHandle)
    }
    #[inline]
    pub fn release(&mut self, h: OrderHandle) {
        self.0.release(h.0)
    }
    #[inline]
    pub fn get(&self, h: OrderHandle) -> &Order {
        self.0.get(h.0)
    }
    #[inline]
    pub fn get_mut(&mut self, h: OrderHandle) -> &mut Order {
        self.0.get_mut(h.0)
    }
}

/// The price-level object pool: `borrow`/`release` work in terms of `LevelHandle`.
pub struct LevelPool(LevelArena);

impl LevelPool {
    pub fn with_capacity(capacity: u32) -> Self {
        Self(LevelArena::with_capacity(capacity))
    }
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.0.capacity()
    }
    #[inline]
    pub fn available(&self) -> u32 {
        self.0.available()
    }
    #[inline]
    pub fn borrow(&mut self) -> Result<LevelHandle, PoolExhausted> {
        self.0.borrow().map(LevelHandle)
    }
    #[inline]
    pub fn release(&mut self, h: LevelHandle) {
        self.0.release(h.0)
    }
    #[inline]
    pub fn get(&self, h: LevelHandle) -> &PriceLevel {
        self.0.get(h.0)
    }
    #[inline]
    pub fn get_mut(&mut self, h: LevelHandle) -> &mut PriceLevel {
        self.0.get_mut(h.0)
    }
}
