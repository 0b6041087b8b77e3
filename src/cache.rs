//! Cache invalidation hook run after a batch of writes.

use parking_lot::Mutex;

/// Receives the names of TLDs whose stored revision changed.
///
/// Invalidation is fire-and-forget: implementations handle their own
/// failures, and callers never wait on or inspect the outcome.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, names: &[String]);
}

/// Invalidator for setups without a cache.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopInvalidator;

impl CacheInvalidator for NoopInvalidator {
    fn invalidate(&self, _names: &[String]) {}
}

/// Invalidator that remembers every call; useful for embedding and tests.
#[derive(Debug, Default)]
pub struct RecordingInvalidator {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name lists received so far, one entry per call.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }
}

impl CacheInvalidator for RecordingInvalidator {
    fn invalidate(&self, names: &[String]) {
        self.calls.lock().push(names.to_vec());
    }
}
