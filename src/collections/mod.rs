//! Shared collections used by traversals
//!
//! The claim registry and the pedigree tree are the only mutable state
//! shared between concurrent work units. Both keep their critical sections
//! to a single map or set operation and never hold a lock across a fetch.

pub mod pedigree;
pub mod visited;

pub use pedigree::PedigreeTree;
pub use visited::VisitedRegistry;
