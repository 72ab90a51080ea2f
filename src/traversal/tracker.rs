//! Termination detection for in-flight work
//!
//! A queue that is momentarily empty says nothing about whether a worker is
//! about to enqueue more work. The tracker instead counts outstanding work
//! units: a unit is counted from the moment it is created until its whole
//! expansion has finished, and the traversal has converged exactly when
//! the count is back to zero.

use std::sync::Arc;

use tokio::sync::watch;

/// Counter of outstanding work units with a waitable zero
#[derive(Debug)]
pub struct TerminationTracker {
    outstanding: Arc<watch::Sender<usize>>,
}

impl Default for TerminationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminationTracker {
    /// Create a tracker with no outstanding work
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(0);
        Self {
            outstanding: Arc::new(sender),
        }
    }

    /// Register a new work unit
    ///
    /// The unit stays outstanding until the returned guard is dropped.
    #[must_use = "dropping the guard immediately completes the work unit"]
    pub fn begin(&self) -> WorkGuard {
        self.outstanding.send_modify(|count| *count += 1);
        WorkGuard {
            outstanding: Arc::clone(&self.outstanding),
        }
    }

    /// Number of work units currently outstanding
    #[must_use]
    pub fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    /// Wait until no work is outstanding
    ///
    /// Callers must register the first unit before waiting; a tracker that
    /// never had work is idle immediately.
    pub async fn wait_idle(&self) {
        let mut receiver = self.outstanding.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = receiver.wait_for(|count| *count == 0).await;
    }
}

/// Keeps one work unit outstanding until dropped
#[derive(Debug)]
pub struct WorkGuard {
    outstanding: Arc<watch::Sender<usize>>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.outstanding.send_modify(|count| *count -= 1);
    }
}
