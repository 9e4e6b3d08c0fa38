//! Deterministic, single-instrument limit-order-book matching engine.
//!
//! Pipeline: `decoder` (ingress view) → `queue` (SPSC command ring) →
//! `engine` (crossing-the-spread state machine) → `book` (hybrid
//! hash+tree+FIFO) → `events` (sink). `pool` backs `book`'s orders and
//! price levels with zero steady-state allocation.

mod book;
mod config;
mod decoder;
mod engine;
mod error;
mod events;
mod pool;
mod price_index;
mod queue;
mod rbtree;
mod types;
mod warmup;

pub use book::Book;
pub use config::{CfgError, EngineCfg};
pub use decoder::{
    DecodeError, InboundView, OutboundView, ReportStatus, encode_inbound, encode_outbound,
    INBOUND_FRAME_LEN, OUTBOUND_FRAME_LEN,
};
pub use engine::Engine;
pub use error::{FatalError, abort_matching_thread};
pub use events::{EngineEvent, EvAccepted, EvTrade, EventSink, NullSink, RecordingSink};
pub use pool::{LevelPool, Order, OrderPool, PoolExhausted, PriceLevel};
pub use price_index::PriceIndex;
pub use queue::{Command, CommandRing};
pub use rbtree::RbTree;
pub use types::{H_NONE, L_NONE, LevelHandle, OrderHandle, OrderId, Price, Qty, Side};
pub use warmup::warm_up;