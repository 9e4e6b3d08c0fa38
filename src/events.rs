//! Execution events and the sink interface the engine reports through
//! (§6.3, §9 "Polymorphism"). A tagged-variant enum plus a thin trait is
//! all the capability set `{on_trade, on_accepted, on_rejected}` needs —
//! no inheritance hierarchy.
#![allow(dead_code)]

use crate::types::{OrderId, Price, Qty, Side};

/// One fill slice. Emitted twice per slice by `Book::match_incoming`:
/// passive (maker) first, then aggressor (taker), carrying the same
/// `price` — always the resting level's price, never the aggressor's limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvTrade {
    pub order_id: OrderId,
    pub price: Price,
    pub qty: Qty,
    pub side: Side,
}

/// Emitted once per input order that rests with a nonzero residual
/// (§6.3). An order that fully fills on entry never produces this event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvAccepted {
    pub order_id: OrderId,
    pub price: Price,
    pub qty: Qty,
    pub side: Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Trade(EvTrade),
    Accepted(EvAccepted),
}

/// The engine's only output-side dependency. Invoked synchronously on the
/// matching thread (§5); the sink's own thread-safety, if it forwards
/// events elsewhere, is its responsibility, not the engine's.
pub trait EventSink {
    fn on_trade(&mut self, order_id: OrderId, price: Price, qty: Qty, side: Side);
    fn on_accepted(&mut self, order_id: OrderId, price: Price, qty: Qty, side: Side);
    /// No path in this core calls this today (input validation happens
    /// upstream of the ring buffer, per §7), but the capability set is
    /// part of the sink's contract regardless.
    fn on_rejected(&mut self, order_id: OrderId);
}

/// Discards everything. Useful in tests and benchmarks that only care
/// about book state, not the event stream.
pub struct NullSink;

impl EventSink for NullSink {
    #[inline]
    fn on_trade(&mut self, _order_id: OrderId, _price: Price, _qty: Qty, _side: Side) {}
    #[inline]
    fn on_accepted(&mut self, _order_id: OrderId, _price: Price, _qty: Qty, _side: Side) {}
    #[inline]
    fn on_rejected(&mut self, _order_id: OrderId) {}
}

/// Appends every event to a `Vec` in emission order. Used by tests that
/// assert on the exact event sequence (§8 scenarios).
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<EngineEvent>,
}

impl EventSink for RecordingSink {
    fn on_trade(&mut self, order_id: OrderId, price: Price, qty: Qty, side: Side) {
        self.events.push(EngineEvent::Trade(EvTrade { order_id, price, qty, side }));
    }
    fn on_accepted(&mut self, order_id: OrderId, price: Price, qty: Qty, side: Side) {
        self.events.push(EngineEvent::Accepted(EvAccepted { order_id, price, qty, side }));
    }
    fn on_rejected(&mut self, _order_id: OrderId) {}
}
