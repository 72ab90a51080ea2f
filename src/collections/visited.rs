//! Claim registry for identifiers
//!
//! Exactly one caller may claim an identifier for fetching. The registry is
//! the only point of synchronization that prevents duplicate fetches, so
//! its critical section is a single set insert and nothing else.

use std::sync::{Mutex, PoisonError};

use rustc_hash::FxHashSet;

use crate::models::{RecordId, RecordKind};

/// Thread-safe set of claimed family and person identifiers
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    families: Mutex<FxHashSet<RecordId>>,
    persons: Mutex<FxHashSet<RecordId>>,
}

impl VisitedRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a family identifier
    ///
    /// Returns `true` iff this call was the first to claim `id`.
    pub fn claim_family(&self, id: &RecordId) -> bool {
        Self::claim_in(&self.families, id)
    }

    /// Claim a person identifier
    ///
    /// Returns `true` iff this call was the first to claim `id`.
    pub fn claim_person(&self, id: &RecordId) -> bool {
        Self::claim_in(&self.persons, id)
    }

    /// Claim an identifier of the given kind
    pub fn claim(&self, kind: RecordKind, id: &RecordId) -> bool {
        match kind {
            RecordKind::Family => self.claim_family(id),
            RecordKind::Person => self.claim_person(id),
        }
    }

    /// Whether an identifier of the given kind has been claimed
    #[must_use]
    pub fn is_claimed(&self, kind: RecordKind, id: &RecordId) -> bool {
        let set = match kind {
            RecordKind::Family => &self.families,
            RecordKind::Person => &self.persons,
        };
        set.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// Number of claimed identifiers of the given kind
    #[must_use]
    pub fn claimed(&self, kind: RecordKind) -> usize {
        let set = match kind {
            RecordKind::Family => &self.families,
            RecordKind::Person => &self.persons,
        };
        set.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn claim_in(set: &Mutex<FxHashSet<RecordId>>, id: &RecordId) -> bool {
        debug_assert!(!id.is_sentinel(), "sentinel ids must be filtered before claim");
        // A set only ever grows, so a poisoned lock still holds a valid set
        let mut guard = set.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.contains(id) {
            return false;
        }
        guard.insert(id.clone())
    }
}
