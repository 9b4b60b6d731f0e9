//! Statistics for fetch runs.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Statistics collected during a fetch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchStats {
    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run completed
    pub completed_at: Option<DateTime<Utc>>,

    /// Number of entries returned by the listing
    pub entries_listed: usize,

    /// Number of folder markers materialized as directories
    pub folders_created: usize,

    /// Number of objects downloaded to files
    pub files_downloaded: usize,

    /// Total bytes written to local files
    pub bytes_downloaded: u64,
}

impl FetchStats {
    /// Create a new stats tracker with the current time as start time.
    pub fn new() -> Self {
        Self {
            started_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Mark the run as complete with the current time.
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Record a folder marker that was materialized.
    pub fn record_folder(&mut self) {
        self.folders_created += 1;
    }

    /// Record a downloaded object.
    pub fn record_file(&mut self, bytes: u64) {
        self.files_downloaded += 1;
        self.bytes_downloaded += bytes;
    }

    /// Number of entries processed (folders plus files).
    pub fn entries_processed(&self) -> usize {
        self.folders_created + self.files_downloaded
    }

    /// Get the duration of the run.
    pub fn duration(&self) -> Option<Duration> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Calculate the throughput in entries per second.
    pub fn entries_per_second(&self) -> Option<f64> {
        self.duration().map(|d| {
            let secs = d.num_milliseconds() as f64 / 1000.0;
            if secs > 0.0 {
                self.entries_processed() as f64 / secs
            } else {
                0.0
            }
        })
    }
}
