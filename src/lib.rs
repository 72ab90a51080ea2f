//! Concurrent retrieval of family pedigrees from a remote record service.
//!
//! Starting from a root family, a traversal fetches the family, its spouses
//! and children, and then every family in which a fetched person was a
//! child, until the reachable ancestor graph has been retrieved exactly
//! once into a shared [`PedigreeTree`]. Three strategies are provided:
//! depth-first fan-out, breadth-first with a worker pool, and breadth-first
//! with a hard cap on in-flight fetches.

pub mod collections;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod traversal;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use collections::{PedigreeTree, VisitedRegistry};
pub use config::TraversalConfig;
pub use error::{PedigreeError, Result};
pub use models::{FamilyRecord, PersonRecord, RecordId, RecordKind};

// Record service
pub use fetch::{BlockingFetcher, BlockingSource, InMemoryFetcher, RecordFetcher};

// Traversals
pub use traversal::{
    StatsSnapshot, TraversalReport, TraversalStrategy, traverse_async, traverse_breadth_first,
    traverse_breadth_first_async, traverse_breadth_first_bounded,
    traverse_breadth_first_bounded_async, traverse_depth_first, traverse_depth_first_async,
};
