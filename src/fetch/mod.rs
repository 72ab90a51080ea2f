//! Record fetcher seam
//!
//! Traversals consume the record service only through [`RecordFetcher`].
//! A fetch that fails and a fetch that finds nothing are treated the same
//! way by every strategy: the branch is abandoned and counted, and the
//! traversal carries on.

pub mod blocking;
pub mod memory;

use std::future::Future;
use std::pin::Pin;

use crate::error::Result;
use crate::models::{FamilyRecord, PersonRecord, RecordId};

pub use blocking::{BlockingFetcher, BlockingSource};
pub use memory::InMemoryFetcher;

/// Future returned by a fetcher call
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<Option<T>>> + Send + 'a>>;

/// Core trait for retrieving records from the record service
pub trait RecordFetcher: Send + Sync + 'static {
    /// Fetch a family record
    ///
    /// Resolves to `Ok(None)` when the service has no such family.
    fn fetch_family<'a>(&'a self, id: &'a RecordId) -> FetchFuture<'a, FamilyRecord>;

    /// Fetch a person record
    ///
    /// Resolves to `Ok(None)` when the service has no such person.
    fn fetch_person<'a>(&'a self, id: &'a RecordId) -> FetchFuture<'a, PersonRecord>;
}
