//! bg-fetcher - recursive bucket download for bucket-grab.
//!
//! This crate mirrors an S3 bucket (or a folder within it) into a local
//! directory. It supports:
//!
//! - Delimiter-scoped, paginated listing expanded depth-first over every
//!   common prefix
//! - Ordered materialization: folder markers become directories, objects are
//!   streamed into files with parents created on demand
//! - Optional bounded concurrency that leaves ordering and the final tree
//!   unchanged
//! - Pluggable storage backends (S3 and in-memory) and progress sinks
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bg_fetcher::{FetchConfig, Fetcher, NoopProgress, S3Backend, S3Config, create_s3_client};
//!
//! let s3_config = S3Config::new("my-bucket")
//!     .with_prefix("docs/")
//!     .with_credentials("AKIA...", "secret");
//!
//! let client = create_s3_client(&s3_config).await?;
//!
//! let fetcher = Fetcher::new(
//!     Arc::new(S3Backend::new(client)),
//!     "my-bucket",
//!     Some("docs/".to_string()),
//!     FetchConfig::new().with_destination("./out"),
//! );
//!
//! let stats = fetcher.run(&NoopProgress).await?;
//! eprintln!("Downloaded {} file(s)", stats.entries_processed());
//! ```

pub mod backend;
pub mod config;
pub mod entry;
pub mod fetcher;
pub mod lister;
pub mod materializer;
pub mod memory;
pub mod progress;
pub mod s3;
pub mod stats;

pub use backend::{ObjectByteStream, StorageBackend};
pub use config::FetchConfig;
pub use entry::{DELIMITER, DownloadTarget, ListingPage, ObjectEntry};
pub use fetcher::Fetcher;
pub use lister::NamespaceLister;
pub use materializer::{EntryOutcome, Materializer};
pub use memory::MemoryBackend;
pub use progress::{NoopProgress, Progress};
pub use s3::{S3Backend, S3Config, create_s3_client};
pub use stats::FetchStats;
