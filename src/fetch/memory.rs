//! In-memory record service
//!
//! Serves a fixed set of records, optionally with simulated network latency
//! and injected failures. The demo binary and the test suite use it as a
//! deterministic stand-in for the remote service.

use std::time::Duration;

use rand::Rng;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use super::{FetchFuture, RecordFetcher};
use crate::error::{PedigreeError, Result};
use crate::models::{FamilyRecord, PersonRecord, RecordId, RecordKind};

/// Serialized form of a record set: `{"families": [...], "people": [...]}`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RecordDump {
    #[serde(default)]
    pub families: Vec<FamilyRecord>,
    #[serde(default)]
    pub people: Vec<PersonRecord>,
}

/// Fetcher backed by an in-memory record set
#[derive(Debug, Default, Clone)]
pub struct InMemoryFetcher {
    families: FxHashMap<RecordId, FamilyRecord>,
    persons: FxHashMap<RecordId, PersonRecord>,
    max_latency: Option<Duration>,
    failing: FxHashSet<(RecordKind, RecordId)>,
}

impl InMemoryFetcher {
    /// Create an empty fetcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fetcher from a JSON record dump
    ///
    /// # Errors
    /// Returns an error if the document is not a valid record dump
    pub fn from_json(body: &str) -> Result<Self> {
        let dump: RecordDump = serde_json::from_str(body)?;
        Ok(Self::from_dump(dump))
    }

    /// Build a fetcher from a record dump
    #[must_use]
    pub fn from_dump(dump: RecordDump) -> Self {
        let mut fetcher = Self::new();
        for family in dump.families {
            fetcher.add_family(family);
        }
        for person in dump.people {
            fetcher.add_person(person);
        }
        fetcher
    }

    /// Add or replace a family record
    pub fn add_family(&mut self, family: FamilyRecord) {
        self.families.insert(family.id.clone(), family);
    }

    /// Add or replace a person record
    pub fn add_person(&mut self, person: PersonRecord) {
        self.persons.insert(person.id.clone(), person);
    }

    /// Delay every fetch by a uniformly random duration up to `max_latency`
    #[must_use]
    pub fn with_latency(mut self, max_latency: Duration) -> Self {
        self.max_latency = Some(max_latency);
        self
    }

    /// Make every fetch of the given record fail
    #[must_use]
    pub fn with_failure(mut self, kind: RecordKind, id: impl Into<RecordId>) -> Self {
        self.failing.insert((kind, id.into()));
        self
    }

    /// Number of families served
    #[must_use]
    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    /// Number of persons served
    #[must_use]
    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    fn sample_delay(&self) -> Option<Duration> {
        let max = self.max_latency?;
        let millis = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
        Some(Duration::from_millis(rand::rng().random_range(0..=millis)))
    }

    async fn respond<T: Clone>(
        &self,
        kind: RecordKind,
        id: &RecordId,
        records: &FxHashMap<RecordId, T>,
    ) -> Result<Option<T>> {
        if let Some(delay) = self.sample_delay() {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&(kind, id.clone())) {
            return Err(PedigreeError::fetch(kind, id.as_str(), "injected failure"));
        }
        Ok(records.get(id).cloned())
    }
}

impl RecordFetcher for InMemoryFetcher {
    fn fetch_family<'a>(&'a self, id: &'a RecordId) -> FetchFuture<'a, FamilyRecord> {
        Box::pin(self.respond(RecordKind::Family, id, &self.families))
    }

    fn fetch_person<'a>(&'a self, id: &'a RecordId) -> FetchFuture<'a, PersonRecord> {
        Box::pin(self.respond(RecordKind::Person, id, &self.persons))
    }
}
