//! Local materialization of listed entries.
//!
//! Folder markers become directories, everything else is streamed from the
//! backend into a file at `destination / key`. Parent directories are created
//! on demand since many objects have no explicit folder-marker ancestor.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bg_error::{BgError, Result};
use futures::{StreamExt, TryStreamExt, stream};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace};

use crate::backend::StorageBackend;
use crate::entry::{DownloadTarget, ObjectEntry};
use crate::progress::Progress;
use crate::stats::FetchStats;

/// What happened to a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    /// A folder marker was materialized as a directory
    Folder,
    /// An object was written to a file of this many bytes
    File { bytes: u64 },
}

/// Writes listed entries under a destination root.
pub struct Materializer<B: StorageBackend> {
    backend: Arc<B>,
    bucket: String,
    destination: PathBuf,
    concurrency: usize,
}

impl<B: StorageBackend> Materializer<B> {
    /// Create a materializer writing objects from `bucket` under `destination`.
    pub fn new(
        backend: Arc<B>,
        bucket: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
            destination: destination.into(),
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` entries in flight at once.
    ///
    /// Outcomes are still consumed in listing order, so progress advances
    /// monotonically and the resulting tree does not depend on this value.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Materialize `entries` in order, calling `progress.increment()` after each.
    ///
    /// The first failure aborts the run. Files already written, including a
    /// partially written file for the failing entry, are left in place.
    pub async fn materialize<P: Progress + ?Sized>(
        &self,
        entries: &[ObjectEntry],
        progress: &P,
    ) -> Result<FetchStats> {
        let mut stats = FetchStats::new();

        // buffered(1) never starts an entry before the previous one finished
        let mut outcomes = stream::iter(entries)
            .map(|entry| self.materialize_entry(entry))
            .buffered(self.concurrency);

        while let Some(outcome) = outcomes.try_next().await? {
            match outcome {
                EntryOutcome::Folder => stats.record_folder(),
                EntryOutcome::File { bytes } => stats.record_file(bytes),
            }
            progress.increment();
        }

        stats.complete();
        Ok(stats)
    }

    /// Materialize a single entry.
    pub async fn materialize_entry(&self, entry: &ObjectEntry) -> Result<EntryOutcome> {
        let target = DownloadTarget::resolve(&self.destination, &entry.key)?;

        if entry.is_folder_marker() {
            ensure_dir(&target.local_path).await?;
            debug!(key = %entry.key, path = %target.local_path.display(), "Materialized folder");
            return Ok(EntryOutcome::Folder);
        }

        if let Some(parent) = target.local_path.parent() {
            ensure_dir(parent).await?;
        }

        let bytes = self.download(&target).await?;
        debug!(
            key = %entry.key,
            path = %target.local_path.display(),
            bytes,
            "Downloaded object"
        );

        Ok(EntryOutcome::File { bytes })
    }

    /// Stream the object into a newly created file.
    ///
    /// The file is flushed and closed before returning, also when the copy
    /// fails, so partial bytes are on disk once the error is observed.
    async fn download(&self, target: &DownloadTarget) -> Result<u64> {
        let mut body = self.backend.open_object(&self.bucket, &target.key).await?;

        let mut file = File::create(&target.local_path)
            .await
            .map_err(|e| BgError::local_write(&target.local_path, e))?;

        let mut written = 0u64;
        let copied = async {
            while let Some(chunk) = body.try_next().await? {
                file.write_all(&chunk)
                    .await
                    .map_err(|e| BgError::local_write(&target.local_path, e))?;
                written += chunk.len() as u64;
                trace!(key = %target.key, written, "Wrote chunk");
            }
            Ok::<(), BgError>(())
        }
        .await;

        // Waits for any write still running on the blocking pool
        let flushed = file
            .flush()
            .await
            .map_err(|e| BgError::local_write(&target.local_path, e));
        drop(file);

        copied?;
        flushed?;
        Ok(written)
    }
}

/// Create `path` and its ancestors unless it already is a directory.
async fn ensure_dir(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        _ => tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| BgError::local_write(path, e)),
    }
}
