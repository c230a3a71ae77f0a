//! Progress reporting trait for long-running pipeline stages.
//!
//! The download and orchestration code reports progress through a
//! [`ProgressCallback`] so it stays decoupled from any rendering
//! backend. The CLI provides an `indicatif` implementation; tests and
//! headless runs use [`NullProgress`].

use std::sync::Arc;

/// Receives progress updates from a long-running operation.
///
/// Implementations must be `Send + Sync` so a single callback can be
/// shared across await points via `Arc`.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total expected units of work (bytes for a download,
    /// partitions for a country run).
    fn set_total(&self, total: u64);

    /// Advances progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Replaces the message shown alongside the indicator.
    fn set_message(&self, msg: String);

    /// Marks the operation complete and removes the indicator.
    fn finish_and_clear(&self);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`] instance for convenient use.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
