//! Traversal counters and the final report
//!
//! Counters are for observability only; no control flow reads them.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Live counters for one traversal
#[derive(Debug, Default)]
pub struct TraversalStats {
    families_fetched: AtomicUsize,
    persons_fetched: AtomicUsize,
    fetch_failures: AtomicUsize,
    absent_records: AtomicUsize,
    duplicate_claims: AtomicUsize,
    sentinel_links: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl TraversalStats {
    pub(crate) fn record_family(&self) {
        self.families_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_person(&self) {
        self.persons_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_absent(&self) {
        self.absent_records.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate_claim(&self) {
        self.duplicate_claims.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sentinels(&self, count: usize) {
        if count > 0 {
            self.sentinel_links.fetch_add(count, Ordering::Relaxed);
        }
    }

    /// Mark a fetch as in flight until the returned guard drops
    pub(crate) fn enter_fetch(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::AcqRel);
        InFlight { stats: self }
    }

    /// Copy the current counter values
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            families_fetched: self.families_fetched.load(Ordering::Relaxed),
            persons_fetched: self.persons_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            absent_records: self.absent_records.load(Ordering::Relaxed),
            duplicate_claims: self.duplicate_claims.load(Ordering::Relaxed),
            sentinel_links: self.sentinel_links.load(Ordering::Relaxed),
            peak_in_flight: self.peak_in_flight.load(Ordering::Acquire),
        }
    }
}

/// Guard for one in-flight fetch
pub(crate) struct InFlight<'a> {
    stats: &'a TraversalStats,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.stats.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Counter values at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub families_fetched: usize,
    pub persons_fetched: usize,
    /// Fetches that returned an error
    pub fetch_failures: usize,
    /// Fetches for which the service had no record
    pub absent_records: usize,
    /// Claims refused because another unit already owned the identifier
    pub duplicate_claims: usize,
    /// Links skipped because they were absent, empty or zero
    pub sentinel_links: usize,
    /// Highest number of fetcher calls observed in flight at once
    pub peak_in_flight: usize,
}

impl StatsSnapshot {
    /// Total fetcher calls issued
    #[must_use]
    pub const fn total_fetches(&self) -> usize {
        self.families_fetched + self.persons_fetched + self.fetch_failures + self.absent_records
    }
}

/// Outcome of a completed traversal
#[derive(Debug, Clone)]
pub struct TraversalReport {
    pub strategy: &'static str,
    pub stats: StatsSnapshot,
    /// Families in the tree when the traversal finished
    pub families: usize,
    /// Persons in the tree when the traversal finished
    pub persons: usize,
    pub elapsed: Duration,
}

impl TraversalReport {
    /// Report for a traversal that had nothing to do
    #[must_use]
    pub fn empty(strategy: &'static str) -> Self {
        Self {
            strategy,
            stats: StatsSnapshot::default(),
            families: 0,
            persons: 0,
            elapsed: Duration::ZERO,
        }
    }
}

impl fmt::Display for TraversalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} families, {} persons in {:?} ({} fetches, {} failed, {} absent, peak {} in flight)",
            self.strategy,
            self.families,
            self.persons,
            self.elapsed,
            self.stats.total_fetches(),
            self.stats.fetch_failures,
            self.stats.absent_records,
            self.stats.peak_in_flight
        )
    }
}
