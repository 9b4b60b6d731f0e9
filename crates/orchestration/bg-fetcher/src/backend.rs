//! Storage backend abstraction consumed by the lister and materializer.
//!
//! - [`crate::s3::S3Backend`] talks to S3 (or an S3-compatible endpoint)
//! - [`crate::memory::MemoryBackend`] serves an in-process key space

use async_trait::async_trait;
use bg_error::Result;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::entry::ListingPage;

/// A single-use, sequential stream of an object's bytes.
pub type ObjectByteStream = BoxStream<'static, Result<Bytes>>;

/// Object storage operations needed to mirror a bucket locally.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Fetch one page of a delimiter-scoped listing.
    ///
    /// Errors map to [`bg_error::BgError::Listing`].
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage>;

    /// Open a byte stream over the object stored under `key`.
    ///
    /// Errors, both when opening and mid-stream, map to
    /// [`bg_error::BgError::RemoteRead`].
    async fn open_object(&self, bucket: &str, key: &str) -> Result<ObjectByteStream>;
}
