//! In-process [`StorageBackend`] with S3 delimiter and pagination semantics.
//!
//! Useful for tests and dry runs. Keys are served in lexicographic order,
//! pages hold at most `page_size` items (objects and common prefixes
//! combined, as S3 counts them), and failures can be injected per prefix or
//! per key.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use bg_error::{BgError, Result};
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;

use crate::backend::{ObjectByteStream, StorageBackend};
use crate::entry::{ListingPage, ObjectEntry};

const DEFAULT_PAGE_SIZE: usize = 1000;
const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// In-memory bucket contents keyed by bucket name.
pub struct MemoryBackend {
    buckets: HashMap<String, BTreeMap<String, Bytes>>,
    page_size: usize,
    chunk_size: usize,
    failing_prefixes: HashSet<String>,
    failing_reads: HashMap<String, usize>,
    opened: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    open_streams: Arc<AtomicUsize>,
    max_open_streams: Arc<AtomicUsize>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
            page_size: DEFAULT_PAGE_SIZE,
            chunk_size: DEFAULT_CHUNK_SIZE,
            failing_prefixes: HashSet::new(),
            failing_reads: HashMap::new(),
            opened: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            open_streams: Arc::new(AtomicUsize::new(0)),
            max_open_streams: Arc::new(AtomicUsize::new(0)),
        }
    }
}

enum Item {
    Object(ObjectEntry),
    Prefix(String),
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an object.
    pub fn with_object(
        mut self,
        bucket: impl Into<String>,
        key: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.buckets
            .entry(bucket.into())
            .or_default()
            .insert(key.into(), data.into());
        self
    }

    /// Create an empty bucket.
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.buckets.entry(bucket.into()).or_default();
        self
    }

    /// Maximum number of items (objects plus common prefixes) per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Size of the chunks yielded by object streams.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Make every listing request for `prefix` fail.
    pub fn with_failing_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.failing_prefixes.insert(prefix.into());
        self
    }

    /// Make the stream for `key` fail after yielding `chunks` chunks.
    pub fn with_failing_read(mut self, key: impl Into<String>, chunks: usize) -> Self {
        self.failing_reads.insert(key.into(), chunks);
        self
    }

    /// Keys whose streams were opened, in order.
    pub fn opened_keys(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `list_page` calls served.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously open object streams observed.
    pub fn max_open_streams(&self) -> usize {
        self.max_open_streams.load(Ordering::SeqCst)
    }

    /// Group the keys under `prefix` into objects and common prefixes.
    fn items(objects: &BTreeMap<String, Bytes>, prefix: &str, delimiter: &str) -> Vec<Item> {
        let mut items = Vec::new();
        let mut last_prefix: Option<String> = None;

        for (key, data) in objects.range(prefix.to_string()..) {
            let Some(rest) = key.strip_prefix(prefix) else {
                break;
            };

            let grouped = if delimiter.is_empty() {
                None
            } else {
                rest.find(delimiter)
                    .map(|idx| format!("{prefix}{}", &rest[..idx + delimiter.len()]))
            };

            match grouped {
                Some(common) => {
                    if last_prefix.as_deref() != Some(common.as_str()) {
                        last_prefix = Some(common.clone());
                        items.push(Item::Prefix(common));
                    }
                }
                None => items.push(Item::Object(
                    ObjectEntry::new(key.clone()).with_size(data.len() as u64),
                )),
            }
        }

        items
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_prefixes.contains(prefix) {
            return Err(BgError::listing(prefix, "injected listing failure"));
        }

        let objects = self
            .buckets
            .get(bucket)
            .ok_or_else(|| BgError::listing(prefix, format!("NoSuchBucket: {bucket}")))?;

        let offset = match continuation_token {
            Some(token) => token.parse::<usize>().map_err(|_| {
                BgError::listing(prefix, format!("invalid continuation token '{token}'"))
            })?,
            None => 0,
        };

        let items = Self::items(objects, prefix, delimiter);
        let total = items.len();
        let end = (offset + self.page_size).min(total);

        let mut page = ListingPage::default();
        for item in items.into_iter().skip(offset).take(end.saturating_sub(offset)) {
            match item {
                Item::Object(entry) => page.contents.push(entry),
                Item::Prefix(common) => page.common_prefixes.push(common),
            }
        }

        if end < total {
            page.next_continuation_token = Some(end.to_string());
        }

        Ok(page)
    }

    async fn open_object(&self, bucket: &str, key: &str) -> Result<ObjectByteStream> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key.to_string());

        let data = self
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .cloned()
            .ok_or_else(|| BgError::remote_read(key, "NoSuchKey"))?;

        let state = StreamState {
            key: key.to_string(),
            data,
            offset: 0,
            chunk_size: self.chunk_size,
            chunks_sent: 0,
            fail_after: self.failing_reads.get(key).copied(),
            _guard: OpenStreamGuard::new(
                Arc::clone(&self.open_streams),
                Arc::clone(&self.max_open_streams),
            ),
        };

        let body = stream::try_unfold(state, |mut state| async move {
            tokio::task::yield_now().await;

            if state.fail_after.is_some_and(|limit| state.chunks_sent >= limit) {
                return Err(BgError::remote_read(&state.key, "injected stream failure"));
            }

            if state.offset >= state.data.len() {
                return Ok(None);
            }

            let end = (state.offset + state.chunk_size).min(state.data.len());
            let chunk = state.data.slice(state.offset..end);
            state.offset = end;
            state.chunks_sent += 1;
            Ok(Some((chunk, state)))
        });

        Ok(body.boxed())
    }
}

struct StreamState {
    key: String,
    data: Bytes,
    offset: usize,
    chunk_size: usize,
    chunks_sent: usize,
    fail_after: Option<usize>,
    _guard: OpenStreamGuard,
}

/// Tracks the number of live object streams.
struct OpenStreamGuard {
    open: Arc<AtomicUsize>,
}

impl OpenStreamGuard {
    fn new(open: Arc<AtomicUsize>, max: Arc<AtomicUsize>) -> Self {
        let now = open.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        Self { open }
    }
}

impl Drop for OpenStreamGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}
