//! Progress reporting hooks.

/// Receives progress notifications for a fetch run.
///
/// `start` and `stop` are called exactly once per run; `increment` once per
/// processed entry, in processing order.
pub trait Progress: Send + Sync {
    /// The listing finished and `total` entries are about to be processed.
    fn start(&self, total: usize);

    /// One more entry was processed.
    fn increment(&self);

    /// The run is over, successfully or not.
    fn stop(&self);
}

/// Progress sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl Progress for NoopProgress {
    fn start(&self, _total: usize) {}

    fn increment(&self) {}

    fn stop(&self) {}
}
