//! Process-wide shutdown coordination.
//! The ctrlc handler sets the flag on SIGINT/SIGTERM; the executor checks it
//! between steps and recursive copies check it between files.
//!
//! Notes:
//! - Relaxed atomics are sufficient for a one-way "stop" flag.
//! - `request()` is safe to call from signal handlers.

use std::sync::atomic::{AtomicBool, Ordering};

static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Request a cooperative shutdown (idempotent).
#[inline]
pub fn request() {
    SHUTDOWN.store(true, Ordering::Relaxed);
}

/// Check whether a shutdown has been requested.
#[inline]
pub fn is_requested() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

/// Clear the flag (tests run several executions in one process).
#[inline]
pub fn reset() {
    SHUTDOWN.store(false, Ordering::Relaxed);
}
