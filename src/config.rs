//! Engine configuration and its validation (§6.4 control surface).
//!
//! The teacher's `EngineCfg` additionally carried price bands, a
//! self-match policy, execution-id sharding, and a market-cold-start
//! flag — all of those govern order types and policies this core's
//! Non-goals explicitly exclude (no cancel/replace, no self-match
//! prevention, no IOC/FOK), so they are dropped rather than kept unused.
#![allow(dead_code)]

use thiserror::Error;

/// Startup parameters; no CLI flags, environment variables, or persisted
/// state are part of the core (§6.4).
#[derive(Clone, Copy, Debug)]
pub struct EngineCfg {
    /// Backing capacity of the order pool (default 1 048 576).
    pub order_pool_capacity: u32,
    /// Backing capacity of the price-level pool (default 1 024).
    pub level_pool_capacity: u32,
    /// Command ring buffer capacity; rounded up to a power of two by the
    /// ring itself (default 65 536).
    pub ring_capacity: u32,
    /// Optional pre-run warm-up iteration count against an isolated
    /// engine instance, not the live book (default 200 000; 0 disables).
    pub warmup_iters: u32,
}

impl Default for EngineCfg {
    fn default() -> Self {
        Self {
            order_pool_capacity: 1_048_576,
            level_pool_capacity: 1_024,
            ring_capacity: 65_536,
            warmup_iters: 200_000,
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CfgError {
    #[error("order pool capacity must be > 0")]
    OrderPoolZero,
    #[error("level pool capacity must be > 0")]
    LevelPoolZero,
    #[error("ring buffer capacity must be > 0")]
    RingCapacityZero,
}

impl EngineCfg {
    pub fn validate(&self) -> Result<(), CfgError> {
        if self.order_pool_capacity == 0 {
            return Err(CfgError::OrderPoolZero);
        }
        if self.level_pool_capacity == 0 {
            return Err(CfgError::LevelPoolZero);
        }
        if self.ring_capacity == 0 {
            return Err(CfgError::RingCapacityZero);
        }
        Ok(())
    }
}
