//! Configuration types for a fetch run.

use std::path::PathBuf;

/// Configuration for a fetch run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Local directory that mirrors the bucket root
    pub destination: PathBuf,

    /// Maximum number of entries materialized at once (1 = strictly sequential)
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("."),
            concurrency: 1,
        }
    }
}

impl FetchConfig {
    /// Create a new fetch configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the destination root.
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Set the download concurrency. Values below 1 are clamped to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}
