//! Work units and their lifecycle

use super::tracker::WorkGuard;
use crate::models::{RecordId, RecordKind};

/// Lifecycle of a work unit
///
/// States only move forward; `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkState {
    /// Created and waiting to be picked up
    Pending,
    /// Waiting for the record service
    Fetching,
    /// Discovering and enqueueing follow-up work
    Expanding,
    /// Accounted for by the termination tracker
    Done,
}

/// One pending or in-flight graph node
#[derive(Debug)]
pub struct WorkUnit {
    pub id: RecordId,
    pub kind: RecordKind,
    pub is_root: bool,
    state: WorkState,
    guard: Option<WorkGuard>,
}

impl WorkUnit {
    /// Create a family unit that is outstanding while `guard` is held
    #[must_use]
    pub fn family(id: RecordId, guard: WorkGuard) -> Self {
        Self {
            id,
            kind: RecordKind::Family,
            is_root: false,
            state: WorkState::Pending,
            guard: Some(guard),
        }
    }

    /// Create the root family unit of a traversal
    #[must_use]
    pub fn root(id: RecordId, guard: WorkGuard) -> Self {
        let mut unit = Self::family(id, guard);
        unit.is_root = true;
        unit
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> WorkState {
        self.state
    }

    /// Move to a later state
    pub fn advance(&mut self, next: WorkState) {
        debug_assert!(
            next > self.state,
            "work unit {} regressed from {:?} to {:?}",
            self.id,
            self.state,
            next
        );
        log::trace!("{} {}: {:?} -> {:?}", self.kind, self.id, self.state, next);
        self.state = next;
        if next == WorkState::Done {
            self.guard.take();
        }
    }
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        // Abandoned units (failed fetch, panicked task) still complete
        if self.state != WorkState::Done {
            self.advance(WorkState::Done);
        }
    }
}
