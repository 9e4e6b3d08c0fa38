//! Pre-run warm-up driver (§6.4). Builds a throwaway `Engine`, feeds it
//! synthetic load to get the allocator, cache, and branch predictor warm,
//! then discards it — the live book and pools are never touched.
#![allow(dead_code)]

use crate::config::EngineCfg;
use crate::engine::Engine;
use crate::events::NullSink;
use crate::types::Side;

/// Runs `cfg.warmup_iters` synthetic `accept_order` calls against an
/// isolated engine instance. A no-op if `warmup_iters == 0`.
pub fn warm_up(cfg: EngineCfg) {
    if cfg.warmup_iters == 0 {
        return;
    }
    let mut engine = Engine::new(cfg);
    let mut sink = NullSink;

    // alternate resting buys/sells across a handful of prices so the
    // book exercises both insert and cross-the-spread paths, same as a
    // real trading session would, without depending on external input.
    for i in 0..cfg.warmup_iters as i64 {
        let price = 100 + (i % 8);
        let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
        engine.accept_order(i + 1, price, 10, side, &mut sink);
    }
}
