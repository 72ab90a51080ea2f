//! Concurrent pedigree traversals
//!
//! Three strategies walk the implicit family/person graph from a root
//! family: recursive depth-first fan-out, level-order breadth-first with a
//! worker pool, and breadth-first with a hard cap on in-flight fetches.
//! All of them share the same per-call state:
//!
//! - a [`VisitedRegistry`]: every identifier is claimed before it is fetched,
//!   so each record is fetched at most once and cycles end on their own
//! - the caller's [`PedigreeTree`], which receives every fetched record
//! - a [`TerminationTracker`] counting outstanding work units
//! - [`TraversalStats`] for observability
//!
//! A failed or empty fetch abandons that one branch; it never fails the
//! traversal.

pub mod bounded;
pub mod breadth_first;
pub mod depth_first;
pub mod queue;
pub mod state;
pub mod stats;
pub mod tracker;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use smallvec::SmallVec;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::Semaphore;

use crate::collections::{PedigreeTree, VisitedRegistry};
use crate::config::TraversalConfig;
use crate::error::{PedigreeError, Result};
use crate::fetch::{FetchFuture, RecordFetcher};
use crate::models::{FamilyRecord, PersonRecord, RecordId, RecordKind};
use crate::utils::logging::{log_abandoned, log_traversal_complete, log_traversal_start};

pub use queue::WorkQueue;
pub use state::{WorkState, WorkUnit};
pub use stats::{StatsSnapshot, TraversalReport, TraversalStats};
pub use tracker::{TerminationTracker, WorkGuard};

/// Traversal strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalStrategy {
    /// Recursive fan-out; the root waits for every spawned task
    DepthFirst,
    /// Level-order with a shared queue and a worker pool
    BreadthFirst,
    /// Breadth-first with at most `max_concurrency` fetches in flight
    Bounded { max_concurrency: usize },
}

impl TraversalStrategy {
    /// Bounded strategy capped at the configured `max_concurrency`
    #[must_use]
    pub const fn bounded(config: &TraversalConfig) -> Self {
        Self::Bounded {
            max_concurrency: config.max_concurrency,
        }
    }

    /// Short name used in logs and reports
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DepthFirst => "depth-first",
            Self::BreadthFirst => "breadth-first",
            Self::Bounded { .. } => "breadth-first-bounded",
        }
    }
}

impl fmt::Display for TraversalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded { max_concurrency } => write!(f, "{} ({max_concurrency})", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

/// State shared by every work unit of one traversal
pub(crate) struct Traversal<F> {
    fetcher: Arc<F>,
    tree: Arc<PedigreeTree>,
    visited: VisitedRegistry,
    tracker: TerminationTracker,
    stats: TraversalStats,
    /// Admission gate; only the bounded strategy has one
    gate: Option<Semaphore>,
}

impl<F: RecordFetcher> Traversal<F> {
    fn new(fetcher: Arc<F>, tree: Arc<PedigreeTree>, gate: Option<Semaphore>) -> Self {
        Self {
            fetcher,
            tree,
            visited: VisitedRegistry::new(),
            tracker: TerminationTracker::new(),
            stats: TraversalStats::default(),
            gate,
        }
    }

    /// Claim an identifier, counting refused claims
    fn claim(&self, kind: RecordKind, id: &RecordId) -> bool {
        let claimed = self.visited.claim(kind, id);
        if !claimed {
            self.stats.record_duplicate_claim();
        }
        claimed
    }

    /// Claim every person of a family that nobody else owns yet
    fn claim_members(&self, family: &FamilyRecord) -> SmallVec<[RecordId; 8]> {
        self.stats.record_sentinels(family.sentinel_links());
        family
            .member_ids()
            .into_iter()
            .filter(|id| self.claim(RecordKind::Person, id))
            .cloned()
            .collect()
    }

    /// Claim the parent families of persons this unit fetched
    ///
    /// A child's parent family is `family` itself, which is skipped without
    /// a claim, so only spouses lead upward.
    fn claim_parent_families(
        &self,
        family: &RecordId,
        persons: &[Arc<PersonRecord>],
    ) -> SmallVec<[RecordId; 2]> {
        let mut parents = SmallVec::new();
        for person in persons {
            match person.parent_family() {
                Some(parent) if parent == family => {}
                Some(parent) if self.claim(RecordKind::Family, parent) => {
                    log::debug!("Discovered family {parent} through person {}", person.id);
                    parents.push(parent.clone());
                }
                Some(_) => {}
                None => self.stats.record_sentinels(1),
            }
        }
        parents
    }

    /// Issue one fetcher call, holding an admission permit if gated
    ///
    /// The permit is released as soon as the call returns, before any
    /// downstream processing.
    async fn gated<'a, T>(
        &'a self,
        call: impl FnOnce() -> FetchFuture<'a, T>,
    ) -> Result<Option<T>> {
        let _permit = match &self.gate {
            Some(gate) => Some(
                gate.acquire()
                    .await
                    .map_err(|e| PedigreeError::Task(e.to_string()))?,
            ),
            None => None,
        };
        let _in_flight = self.stats.enter_fetch();
        call().await
    }

    /// Fetch a claimed family and insert it into the tree
    async fn fetch_family(&self, id: &RecordId) -> Option<Arc<FamilyRecord>> {
        match self.gated(|| self.fetcher.fetch_family(id)).await {
            Ok(Some(family)) => {
                let family = Arc::new(family);
                self.tree.add_family(Arc::clone(&family));
                self.stats.record_family();
                log::debug!(
                    "Fetched family {id} ({} members)",
                    family.member_ids().len()
                );
                Some(family)
            }
            Ok(None) => {
                self.stats.record_absent();
                log_abandoned(RecordKind::Family, id, "no record");
                None
            }
            Err(e) => {
                self.stats.record_failure();
                log_abandoned(RecordKind::Family, id, &e.to_string());
                None
            }
        }
    }

    /// Fetch a claimed person and insert it into the tree
    async fn fetch_person(&self, id: &RecordId) -> Option<Arc<PersonRecord>> {
        match self.gated(|| self.fetcher.fetch_person(id)).await {
            Ok(Some(person)) => {
                let person = Arc::new(person);
                self.tree.add_person(Arc::clone(&person));
                self.stats.record_person();
                log::debug!("Fetched person {id} ({})", person.name);
                Some(person)
            }
            Ok(None) => {
                self.stats.record_absent();
                log_abandoned(RecordKind::Person, id, "no record");
                None
            }
            Err(e) => {
                self.stats.record_failure();
                log_abandoned(RecordKind::Person, id, &e.to_string());
                None
            }
        }
    }

    /// Claim the root and wrap it in a work unit
    fn seed(&self, root: &RecordId) -> Option<WorkUnit> {
        if !self.claim(RecordKind::Family, root) {
            return None;
        }
        Some(WorkUnit::root(root.clone(), self.tracker.begin()))
    }

    fn report(&self, strategy: TraversalStrategy, started: Instant) -> TraversalReport {
        TraversalReport {
            strategy: strategy.name(),
            stats: self.stats.snapshot(),
            families: self.tree.family_count(),
            persons: self.tree.person_count(),
            elapsed: started.elapsed(),
        }
    }
}

/// Run a traversal with the given strategy
///
/// Returns once every family and person reachable from `root` through
/// claimable identifiers has been fetched and inserted into `tree`.
///
/// # Arguments
/// * `strategy` - How to explore the graph
/// * `fetcher` - The record service
/// * `root` - Root family identifier; a sentinel root yields an empty report
/// * `tree` - Tree receiving the records
/// * `config` - Worker pool sizing
///
/// # Errors
/// Returns an error only for an unusable configuration; fetch failures
/// abandon their branch and are reported through the stats.
pub async fn traverse_async<F: RecordFetcher>(
    strategy: TraversalStrategy,
    fetcher: Arc<F>,
    root: &RecordId,
    tree: Arc<PedigreeTree>,
    config: &TraversalConfig,
) -> Result<TraversalReport> {
    config.validate()?;

    let gate = match strategy {
        TraversalStrategy::Bounded { max_concurrency: 0 } => {
            return Err(PedigreeError::InvalidConfig(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        TraversalStrategy::Bounded { max_concurrency } => Some(Semaphore::new(max_concurrency)),
        _ => None,
    };

    if root.is_sentinel() {
        log::warn!("Root family id {root:?} is a sentinel; nothing to traverse");
        return Ok(TraversalReport::empty(strategy.name()));
    }

    log_traversal_start(strategy, root);
    let started = Instant::now();
    let traversal = Arc::new(Traversal::new(fetcher, tree, gate));

    match strategy {
        TraversalStrategy::DepthFirst => depth_first::run(Arc::clone(&traversal), root).await,
        TraversalStrategy::BreadthFirst => {
            breadth_first::run(Arc::clone(&traversal), root, config.workers).await;
        }
        TraversalStrategy::Bounded { max_concurrency } => {
            bounded::run(Arc::clone(&traversal), root, config.workers, max_concurrency).await;
        }
    }

    debug_assert_eq!(traversal.tracker.outstanding(), 0);
    let report = traversal.report(strategy, started);
    log_traversal_complete(&report);
    Ok(report)
}

/// Depth-first traversal
///
/// # Errors
/// See [`traverse_async`].
pub async fn traverse_depth_first_async<F: RecordFetcher>(
    fetcher: Arc<F>,
    root: &RecordId,
    tree: Arc<PedigreeTree>,
    config: &TraversalConfig,
) -> Result<TraversalReport> {
    traverse_async(TraversalStrategy::DepthFirst, fetcher, root, tree, config).await
}

/// Breadth-first traversal
///
/// # Errors
/// See [`traverse_async`].
pub async fn traverse_breadth_first_async<F: RecordFetcher>(
    fetcher: Arc<F>,
    root: &RecordId,
    tree: Arc<PedigreeTree>,
    config: &TraversalConfig,
) -> Result<TraversalReport> {
    traverse_async(TraversalStrategy::BreadthFirst, fetcher, root, tree, config).await
}

/// Breadth-first traversal with at most `max_concurrency` fetches in flight
///
/// # Errors
/// Returns an error if `max_concurrency` is zero; see [`traverse_async`].
pub async fn traverse_breadth_first_bounded_async<F: RecordFetcher>(
    fetcher: Arc<F>,
    root: &RecordId,
    tree: Arc<PedigreeTree>,
    max_concurrency: usize,
    config: &TraversalConfig,
) -> Result<TraversalReport> {
    let strategy = TraversalStrategy::Bounded { max_concurrency };
    traverse_async(strategy, fetcher, root, tree, config).await
}

/// Blocking depth-first traversal, configured from the environment
///
/// # Errors
/// Returns an error if no runtime can be started; see [`traverse_async`].
pub fn traverse_depth_first<F: RecordFetcher>(
    fetcher: Arc<F>,
    root: &RecordId,
    tree: Arc<PedigreeTree>,
) -> Result<TraversalReport> {
    let config = TraversalConfig::from_env();
    block_on_traversal(traverse_depth_first_async(fetcher, root, tree, &config))
}

/// Blocking breadth-first traversal, configured from the environment
///
/// # Errors
/// Returns an error if no runtime can be started; see [`traverse_async`].
pub fn traverse_breadth_first<F: RecordFetcher>(
    fetcher: Arc<F>,
    root: &RecordId,
    tree: Arc<PedigreeTree>,
) -> Result<TraversalReport> {
    let config = TraversalConfig::from_env();
    block_on_traversal(traverse_breadth_first_async(fetcher, root, tree, &config))
}

/// Blocking bounded breadth-first traversal, configured from the environment
///
/// # Errors
/// Returns an error if `max_concurrency` is zero or no runtime can be
/// started; see [`traverse_async`].
pub fn traverse_breadth_first_bounded<F: RecordFetcher>(
    fetcher: Arc<F>,
    root: &RecordId,
    tree: Arc<PedigreeTree>,
    max_concurrency: usize,
) -> Result<TraversalReport> {
    let config = TraversalConfig::from_env();
    block_on_traversal(traverse_breadth_first_bounded_async(
        fetcher,
        root,
        tree,
        max_concurrency,
        &config,
    ))
}

/// Drive a traversal to completion from synchronous code
fn block_on_traversal<T>(traversal: impl Future<Output = Result<T>>) -> Result<T> {
    // Check if we're already in a tokio runtime
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
            Err(PedigreeError::InvalidConfig(
                "blocking traversal called from a current-thread runtime; use the async variant"
                    .to_string(),
            ))
        }
        Ok(handle) => tokio::task::block_in_place(|| handle.block_on(traversal)),
        Err(_) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(traversal)
        }
    }
}
