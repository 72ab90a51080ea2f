//! Pedigree tree collection
//!
//! Stores every family and person record discovered by a traversal, keyed
//! by identifier. Records are inserted whole behind an `Arc`, so a record
//! visible through a lookup is always complete.

use std::sync::{Arc, PoisonError, RwLock};

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::models::{FamilyRecord, PersonRecord, RecordId};

/// Thread-safe store of discovered family and person records
///
/// Families and persons live behind separate locks, so readers of one kind
/// never wait on writers of the other.
#[derive(Debug, Default)]
pub struct PedigreeTree {
    families: RwLock<FxHashMap<RecordId, Arc<FamilyRecord>>>,
    persons: RwLock<FxHashMap<RecordId, Arc<PersonRecord>>>,
}

impl PedigreeTree {
    /// Create an empty tree
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a family record
    ///
    /// Inserting an identifier that is already present is a no-op. Returns
    /// `true` if the record was inserted.
    pub fn add_family(&self, family: impl Into<Arc<FamilyRecord>>) -> bool {
        let family = family.into();
        let mut families = self
            .families
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if families.contains_key(&family.id) {
            return false;
        }
        families.insert(family.id.clone(), family);
        true
    }

    /// Insert a person record
    ///
    /// Inserting an identifier that is already present is a no-op. Returns
    /// `true` if the record was inserted.
    pub fn add_person(&self, person: impl Into<Arc<PersonRecord>>) -> bool {
        let person = person.into();
        let mut persons = self
            .persons
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if persons.contains_key(&person.id) {
            return false;
        }
        persons.insert(person.id.clone(), person);
        true
    }

    /// Get a family by identifier
    #[must_use]
    pub fn get_family(&self, id: &RecordId) -> Option<Arc<FamilyRecord>> {
        self.families
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Get a person by identifier
    #[must_use]
    pub fn get_person(&self, id: &RecordId) -> Option<Arc<PersonRecord>> {
        self.persons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Number of families in the tree
    #[must_use]
    pub fn family_count(&self) -> usize {
        self.families
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of persons in the tree
    #[must_use]
    pub fn person_count(&self) -> usize {
        self.persons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// All family identifiers, sorted
    #[must_use]
    pub fn family_ids(&self) -> Vec<RecordId> {
        self.families
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .sorted()
            .collect_vec()
    }

    /// All person identifiers, sorted
    #[must_use]
    pub fn person_ids(&self) -> Vec<RecordId> {
        self.persons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .sorted()
            .collect_vec()
    }

    /// Whether the tree holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.family_count() == 0 && self.person_count() == 0
    }
}
