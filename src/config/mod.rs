//! Configuration for pedigree traversals.

use crate::error::{PedigreeError, Result};

/// Default cap on concurrently in-flight fetches for the bounded strategy
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Environment variable overriding the worker pool size
pub const WORKERS_ENV: &str = "PEDIGREE_WORKERS";

/// Environment variable overriding the bounded strategy's fetch cap
pub const MAX_CONCURRENCY_ENV: &str = "PEDIGREE_MAX_CONCURRENCY";

/// Configuration for a traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalConfig {
    /// Number of worker loops pulling from the pending-work queue
    /// (breadth-first and bounded strategies)
    pub workers: usize,
    /// Default fetch cap for the bounded strategy, picked up by
    /// [`TraversalStrategy::bounded`](crate::TraversalStrategy::bounded)
    pub max_concurrency: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(4),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl TraversalConfig {
    /// Set the worker pool size
    #[must_use]
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the bounded strategy's fetch cap
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Build a configuration from defaults overridden by environment variables
    ///
    /// Unparseable or zero values are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(workers) = read_env_usize(WORKERS_ENV) {
            config.workers = workers;
        }
        if let Some(max) = read_env_usize(MAX_CONCURRENCY_ENV) {
            config.max_concurrency = max;
        }
        config
    }

    /// Check that the configuration can drive a traversal
    ///
    /// # Errors
    /// Returns an error if the worker count is zero. A zero fetch cap is
    /// only rejected when a bounded traversal actually uses it.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(PedigreeError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn read_env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            log::warn!("Ignoring invalid value {raw:?} for {name}");
            None
        }
    }
}
