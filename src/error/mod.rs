//! Error handling for the pedigree crawler.
//!
//! Fetch failures are local to the work unit that hit them and are never
//! returned from a traversal; the variants here surface from fetchers,
//! record decoding and traversal setup.

use std::io;

use crate::models::RecordKind;

/// Specialized error type for the pedigree crawler
#[derive(Debug, thiserror::Error)]
pub enum PedigreeError {
    /// The record service failed to answer for an identifier
    #[error("Failed to fetch {kind} {id}: {message}")]
    Fetch {
        kind: RecordKind,
        id: String,
        message: String,
    },

    /// The record service has no record for an identifier
    #[error("No {kind} record found for {id}")]
    NotFound { kind: RecordKind, id: String },

    /// A record body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Traversal configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The async runtime could not be started
    #[error("Runtime error: {0}")]
    Runtime(#[from] io::Error),

    /// A spawned task failed to complete
    #[error("Task error: {0}")]
    Task(String),
}

impl PedigreeError {
    /// Create a fetch error for a record
    pub fn fetch(kind: RecordKind, id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            kind,
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error for a record
    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<tokio::task::JoinError> for PedigreeError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Task(error.to_string())
    }
}

/// Result type for pedigree crawler operations
pub type Result<T> = std::result::Result<T, PedigreeError>;
