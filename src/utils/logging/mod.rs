//! Logging utilities for output and progress tracking
//!
//! This module provides utilities for logging and progress tracking.

pub mod log;
pub mod progress;

// Re-export commonly used functions for convenience
pub use self::log::{log_abandoned, log_traversal_complete, log_traversal_start};
pub use self::progress::{create_traversal_spinner, finish_traversal_spinner};
