use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Count of in-flight API requests, used for the "Working..." indicator.
///
/// Incremented by [`PendingRequests::begin`] and decremented when the returned
/// guard drops, so a request that errors, times out, or whose task is aborted
/// still balances the counter.
#[derive(Debug, Clone, Default)]
pub struct PendingRequests(Arc<AtomicUsize>);

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    pub fn is_busy(&self) -> bool {
        self.count() > 0
    }

    pub fn begin(&self) -> PendingGuard {
        self.0.fetch_add(1, Ordering::AcqRel);
        PendingGuard(Arc::clone(&self.0))
    }
}

#[must_use = "the request is only counted while the guard is alive"]
pub struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}
