//! Fatal error path (§7). Pool exhaustion and invariant violations are
//! both unrecoverable on the matching thread — the engine surfaces
//! nothing to its caller beyond events, so these terminate the process
//! with a diagnostic rather than returning a `Result` the I/O thread
//! could retry.
#![allow(dead_code)]

use thiserror::Error;

use crate::pool::PoolExhausted;

#[derive(Debug, Error)]
pub enum FatalError {
    #[error(transparent)]
    PoolExhausted(#[from] PoolExhausted),
    #[error("invariant violation: {0}")]
    InvariantViolation(&'static str),
}

/// Logs `err` at error level and aborts the matching thread. Capacity
/// planning bugs and invariant violations are both programming errors
/// per §7 — not conditions the I/O thread can meaningfully recover from.
pub fn abort_matching_thread(err: FatalError) -> ! {
    tracing::error!(error = %err, "fatal error on matching thread, aborting");
    std::process::abort();
}
