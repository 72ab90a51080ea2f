//! Utilities shared by the library, the demo binary and the tests

pub mod logging;
pub mod synthetic;

pub use synthetic::SyntheticPedigree;
