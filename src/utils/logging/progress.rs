//! Progress reporting utilities for long-running traversals
//!
//! The number of records a traversal will discover is not known up front,
//! so progress is shown with spinners, using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::traversal::{TraversalReport, TraversalStrategy};

/// Template for a traversal spinner
pub const TRAVERSAL_SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {msg}";

/// Create a spinner for a running traversal
///
/// # Arguments
/// * `strategy` - Strategy driving the traversal, shown as the message
///
/// # Returns
/// A ticking spinner `ProgressBar`
#[must_use]
pub fn create_traversal_spinner(strategy: TraversalStrategy) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template(TRAVERSAL_SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    let pb = ProgressBar::new_spinner().with_style(style);
    pb.set_message(format!("{strategy} traversal running"));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Stop a traversal spinner, leaving a one-line summary behind
pub fn finish_traversal_spinner(pb: &ProgressBar, report: &TraversalReport) {
    pb.finish_with_message(format!(
        "{}: {} families, {} persons in {:.2?}",
        report.strategy, report.families, report.persons, report.elapsed
    ));
}
