use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pedigree_crawler::fetch::FetchFuture;
use pedigree_crawler::{
    FamilyRecord, InMemoryFetcher, PedigreeTree, PersonRecord, RecordFetcher, RecordId,
    RecordKind, TraversalConfig,
};
use rustc_hash::FxHashMap;

/// Initialize logging once for the whole test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Configuration used by tests that do not care about pool sizing
#[must_use]
pub fn test_config() -> TraversalConfig {
    TraversalConfig::default().with_workers(8)
}

/// A fresh shared tree
#[must_use]
pub fn new_tree() -> Arc<PedigreeTree> {
    Arc::new(PedigreeTree::new())
}

/// Fetcher that records every call it forwards to an [`InMemoryFetcher`]
pub struct CountingFetcher {
    inner: InMemoryFetcher,
    calls: Mutex<FxHashMap<(RecordKind, RecordId), usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

struct CallGuard<'a> {
    in_flight: &'a AtomicUsize,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl CountingFetcher {
    #[must_use]
    pub fn new(inner: InMemoryFetcher) -> Self {
        Self {
            inner,
            calls: Mutex::new(FxHashMap::default()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    fn enter(&self, kind: RecordKind, id: &RecordId) -> CallGuard<'_> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry((kind, id.clone()))
            .or_default() += 1;
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
        CallGuard {
            in_flight: &self.in_flight,
        }
    }

    /// Number of calls made for one record
    #[must_use]
    pub fn calls(&self, kind: RecordKind, id: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(&(kind, RecordId::new(id)))
            .copied()
            .unwrap_or(0)
    }

    /// Highest number of calls made for any single record
    #[must_use]
    pub fn max_calls_per_record(&self) -> usize {
        self.calls.lock().unwrap().values().copied().max().unwrap_or(0)
    }

    /// Total number of calls made
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    /// Highest number of calls that were in flight at the same time
    #[must_use]
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Acquire)
    }
}

impl RecordFetcher for CountingFetcher {
    fn fetch_family<'a>(&'a self, id: &'a RecordId) -> FetchFuture<'a, FamilyRecord> {
        Box::pin(async move {
            let _call = self.enter(RecordKind::Family, id);
            self.inner.fetch_family(id).await
        })
    }

    fn fetch_person<'a>(&'a self, id: &'a RecordId) -> FetchFuture<'a, PersonRecord> {
        Box::pin(async move {
            let _call = self.enter(RecordKind::Person, id);
            self.inner.fetch_person(id).await
        })
    }
}

/// Fetcher whose family lookups panic for one identifier
pub struct PanickingFetcher {
    inner: InMemoryFetcher,
    family: RecordId,
}

impl PanickingFetcher {
    #[must_use]
    pub fn new(inner: InMemoryFetcher, family: &str) -> Self {
        Self {
            inner,
            family: RecordId::new(family),
        }
    }
}

impl RecordFetcher for PanickingFetcher {
    fn fetch_family<'a>(&'a self, id: &'a RecordId) -> FetchFuture<'a, FamilyRecord> {
        Box::pin(async move {
            assert_ne!(id, &self.family, "lookup of family {id} blew up");
            self.inner.fetch_family(id).await
        })
    }

    fn fetch_person<'a>(&'a self, id: &'a RecordId) -> FetchFuture<'a, PersonRecord> {
        self.inner.fetch_person(id)
    }
}

fn person(id: &str, parent_family: &str, own_family: &str) -> PersonRecord {
    PersonRecord::new(id, format!("Person {id}"))
        .with_birth_date("1-1-1900")
        .with_parent_family(parent_family)
        .with_own_family(own_family)
}

/// Three generations with one unknown spouse and one unknown grandparent
/// family
///
/// ```text
/// F1: P1 + P2, children P3 P4
/// F2: P5 + P6, children P1 P7    (P1's parents)
/// F3: P8 + "0", children P2      (P2's parents)
/// F4: P9 + P10, children P5      (P5's parents)
/// ```
#[must_use]
pub fn three_generations() -> InMemoryFetcher {
    let mut fetcher = InMemoryFetcher::new();
    fetcher.add_family(
        FamilyRecord::new("F1")
            .with_husband("P1")
            .with_wife("P2")
            .with_child("P3")
            .with_child("P4"),
    );
    fetcher.add_family(
        FamilyRecord::new("F2")
            .with_husband("P5")
            .with_wife("P6")
            .with_child("P1")
            .with_child("P7"),
    );
    fetcher.add_family(
        FamilyRecord::new("F3")
            .with_husband("P8")
            .with_wife("0")
            .with_child("P2"),
    );
    fetcher.add_family(
        FamilyRecord::new("F4")
            .with_husband("P9")
            .with_wife("P10")
            .with_child("P5"),
    );

    for record in [
        person("P1", "F2", "F1"),
        person("P2", "F3", "F1"),
        person("P3", "F1", "0"),
        person("P4", "F1", "0"),
        person("P5", "F4", "F2"),
        person("P6", "0", "F2"),
        person("P7", "F2", "0"),
        person("P8", "0", "F3"),
        person("P9", "", "F4"),
        person("P10", "0", "F4"),
    ] {
        fetcher.add_person(record);
    }
    fetcher
}

/// Families that point back at each other through their spouses
///
/// P1's parents are F2, and P3 (a spouse in F2) names F1 as their parent
/// family. P2 is also listed as a child of F2.
#[must_use]
pub fn cyclic() -> InMemoryFetcher {
    let mut fetcher = InMemoryFetcher::new();
    fetcher.add_family(
        FamilyRecord::new("F1")
            .with_husband("P1")
            .with_wife("P2")
            .with_child("P5"),
    );
    fetcher.add_family(
        FamilyRecord::new("F2")
            .with_husband("P3")
            .with_wife("P4")
            .with_child("P1")
            .with_child("P2"),
    );
    for record in [
        person("P1", "F2", "F1"),
        person("P2", "F2", "F1"),
        person("P3", "F1", "F2"),
        person("P4", "F1", "F2"),
        person("P5", "F1", "0"),
    ] {
        fetcher.add_person(record);
    }
    fetcher
}

/// One family with `children` children and no known ancestors
#[must_use]
pub fn wide_family(children: usize) -> InMemoryFetcher {
    let mut fetcher = InMemoryFetcher::new();
    let mut family = FamilyRecord::new("W").with_husband("H").with_wife("S");
    fetcher.add_person(person("H", "0", "W"));
    fetcher.add_person(person("S", "0", "W"));
    for i in 0..children {
        let id = format!("C{i}");
        fetcher.add_person(person(&id, "W", "0"));
        family = family.with_child(id);
    }
    fetcher.add_family(family);
    fetcher
}

/// Sorted identifiers of the tree, for comparing trees
#[must_use]
pub fn tree_ids(tree: &PedigreeTree) -> (Vec<RecordId>, Vec<RecordId>) {
    (tree.family_ids(), tree.person_ids())
}

/// Small latency so that concurrent branches overlap
pub const TEST_LATENCY: Duration = Duration::from_millis(5);
