//! Main Fetcher implementation.

use std::sync::Arc;

use bg_error::{BgError, Result};
use tracing::{debug, info};

use crate::backend::StorageBackend;
use crate::config::FetchConfig;
use crate::entry::{DELIMITER, DownloadTarget};
use crate::lister::NamespaceLister;
use crate::materializer::Materializer;
use crate::progress::Progress;
use crate::stats::FetchStats;

/// Coordinates a complete run: list everything first, then materialize.
///
/// Generic over the storage backend so the same run logic drives S3 and the
/// in-memory backend.
pub struct Fetcher<B: StorageBackend> {
    backend: Arc<B>,
    bucket: String,
    prefix: Option<String>,
    config: FetchConfig,
}

impl<B: StorageBackend> Fetcher<B> {
    /// Create a new Fetcher.
    ///
    /// # Arguments
    ///
    /// * `backend` - The storage backend to list and read from
    /// * `bucket` - The bucket to download
    /// * `prefix` - Optional folder prefix, `None` for the whole bucket
    /// * `config` - Destination and concurrency settings
    pub fn new(
        backend: Arc<B>,
        bucket: impl Into<String>,
        prefix: Option<String>,
        config: FetchConfig,
    ) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
            prefix,
            config,
        }
    }

    /// Run the fetch.
    ///
    /// No local file is written until the listing has completed. `progress`
    /// is started with the number of listed entries and always stopped, also
    /// when materialization fails.
    pub async fn run<P: Progress + ?Sized>(&self, progress: &P) -> Result<FetchStats> {
        let mut stats = FetchStats::new();
        let prefix = self.prefix.as_deref().unwrap_or_default();

        debug!(
            bucket = %self.bucket,
            prefix = prefix,
            destination = %self.config.destination.display(),
            concurrency = self.config.concurrency,
            "Starting fetch"
        );

        self.prepare_destination(prefix).await?;

        let lister = NamespaceLister::new(Arc::clone(&self.backend), &self.bucket);
        let entries = lister.list(prefix).await?;
        stats.entries_listed = entries.len();

        let materializer = Materializer::new(
            Arc::clone(&self.backend),
            &self.bucket,
            &self.config.destination,
        )
        .with_concurrency(self.config.concurrency);

        progress.start(entries.len());
        let result = materializer.materialize(&entries, progress).await;
        progress.stop();

        let materialized = result?;
        stats.folders_created = materialized.folders_created;
        stats.files_downloaded = materialized.files_downloaded;
        stats.bytes_downloaded = materialized.bytes_downloaded;
        stats.complete();

        info!(
            entries = stats.entries_processed(),
            folders = stats.folders_created,
            files = stats.files_downloaded,
            bytes = stats.bytes_downloaded,
            "Fetch completed"
        );

        Ok(stats)
    }

    /// Create the destination root and the folder the prefix points into.
    ///
    /// Only the part of the prefix up to its last delimiter is created, so
    /// `docs/` creates `docs` while a partial prefix like `logs/2024-` only
    /// creates `logs`.
    async fn prepare_destination(&self, prefix: &str) -> Result<()> {
        let root = &self.config.destination;
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| BgError::local_write(root, e))?;

        let Some(idx) = prefix.rfind(DELIMITER) else {
            return Ok(());
        };

        let folder = &prefix[..idx + DELIMITER.len()];
        let target = DownloadTarget::resolve(root, folder)?;
        tokio::fs::create_dir_all(&target.local_path)
            .await
            .map_err(|e| BgError::local_write(&target.local_path, e))
    }
}
