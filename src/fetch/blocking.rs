//! Adapter for blocking record transports
//!
//! Most record services are reached through a blocking client with its own
//! timeout and retry policy. [`BlockingFetcher`] moves each call onto
//! tokio's blocking pool so that a slow request never stalls a runtime
//! worker.

use std::sync::Arc;

use super::{FetchFuture, RecordFetcher};
use crate::error::Result;
use crate::models::{FamilyRecord, PersonRecord, RecordId};

/// A blocking source of records
pub trait BlockingSource: Send + Sync + 'static {
    /// Fetch a family record, blocking the calling thread
    fn family(&self, id: &RecordId) -> Result<Option<FamilyRecord>>;

    /// Fetch a person record, blocking the calling thread
    fn person(&self, id: &RecordId) -> Result<Option<PersonRecord>>;
}

/// Fetcher that runs a [`BlockingSource`] on the blocking thread pool
#[derive(Debug)]
pub struct BlockingFetcher<S> {
    source: Arc<S>,
}

impl<S: BlockingSource> BlockingFetcher<S> {
    /// Wrap a blocking source
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

impl<S: BlockingSource> RecordFetcher for BlockingFetcher<S> {
    fn fetch_family<'a>(&'a self, id: &'a RecordId) -> FetchFuture<'a, FamilyRecord> {
        let source = Arc::clone(&self.source);
        let id = id.clone();
        Box::pin(async move { tokio::task::spawn_blocking(move || source.family(&id)).await? })
    }

    fn fetch_person<'a>(&'a self, id: &'a RecordId) -> FetchFuture<'a, PersonRecord> {
        let source = Arc::clone(&self.source);
        let id = id.clone();
        Box::pin(async move { tokio::task::spawn_blocking(move || source.person(&id)).await? })
    }
}
