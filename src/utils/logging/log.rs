//! Logging utilities
//!
//! This module provides standardized logging functions for traversals.

use crate::models::{RecordId, RecordKind};
use crate::traversal::{TraversalReport, TraversalStrategy};

/// Log a traversal start with consistent format
///
/// # Arguments
/// * `strategy` - Strategy driving the traversal
/// * `root` - Root family identifier
pub fn log_traversal_start(strategy: TraversalStrategy, root: &RecordId) {
    log::info!("Starting {strategy} traversal from family {root}");
}

/// Log a traversal completion with consistent format
///
/// # Arguments
/// * `report` - Final report of the traversal
pub fn log_traversal_complete(report: &TraversalReport) {
    if report.stats.fetch_failures > 0 || report.stats.absent_records > 0 {
        log::warn!("Completed with abandoned branches: {report}");
    } else {
        log::info!("Completed {report}");
    }
}

/// Log an abandoned branch with consistent format
///
/// # Arguments
/// * `kind` - Kind of record whose fetch was abandoned
/// * `id` - Identifier of the record
/// * `reason` - Why the branch was abandoned
pub fn log_abandoned(kind: RecordKind, id: &RecordId, reason: &str) {
    log::warn!("Abandoning {kind} {id}: {reason}");
}
