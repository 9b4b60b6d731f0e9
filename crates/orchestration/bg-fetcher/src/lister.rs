//! Recursive, paginated namespace listing.

use std::sync::Arc;

use bg_error::{BgError, Result};
use tracing::{debug, info};

use crate::backend::StorageBackend;
use crate::entry::{DELIMITER, ObjectEntry};

/// A page request waiting on the worklist.
struct PendingPage {
    prefix: String,
    continuation_token: Option<String>,
}

/// Expands a prefix into every object beneath it.
///
/// Each delimiter-scoped request only reveals one level of the namespace, so
/// every common prefix is listed in turn. Prefixes are expanded depth-first
/// and in page order: the contents of a page come first, then each of its
/// common prefixes in full, then the next page of the same prefix.
pub struct NamespaceLister<B: StorageBackend> {
    backend: Arc<B>,
    bucket: String,
}

impl<B: StorageBackend> NamespaceLister<B> {
    /// Create a lister for `bucket`.
    pub fn new(backend: Arc<B>, bucket: impl Into<String>) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
        }
    }

    /// List every object under `prefix` (empty for the whole bucket).
    ///
    /// Fails with [`BgError::Listing`] as soon as any page request fails.
    pub async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>> {
        let mut entries = Vec::new();
        let mut pages = 0usize;

        // LIFO worklist standing in for the recursion. A page's continuation
        // sits below its children so they are drained first.
        let mut pending = vec![PendingPage {
            prefix: prefix.to_string(),
            continuation_token: None,
        }];

        while let Some(request) = pending.pop() {
            let page = self
                .backend
                .list_page(
                    &self.bucket,
                    &request.prefix,
                    DELIMITER,
                    request.continuation_token.as_deref(),
                )
                .await?;
            pages += 1;

            debug!(
                prefix = %request.prefix,
                objects = page.contents.len(),
                common_prefixes = page.common_prefixes.len(),
                truncated = page.next_continuation_token.is_some(),
                "Listed page"
            );

            entries.extend(page.contents);

            for common_prefix in &page.common_prefixes {
                if common_prefix.len() <= request.prefix.len()
                    || !common_prefix.starts_with(&request.prefix)
                {
                    return Err(BgError::listing(
                        &request.prefix,
                        format!("backend returned non-nested common prefix '{common_prefix}'"),
                    ));
                }
            }

            if let Some(token) = page.next_continuation_token {
                pending.push(PendingPage {
                    prefix: request.prefix,
                    continuation_token: Some(token),
                });
            }

            pending.extend(
                page.common_prefixes
                    .into_iter()
                    .rev()
                    .map(|common_prefix| PendingPage {
                        prefix: common_prefix,
                        continuation_token: None,
                    }),
            );
        }

        info!(
            bucket = %self.bucket,
            prefix = prefix,
            entries = entries.len(),
            pages,
            "Listing complete"
        );

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use bg_error::ErrorKind;
    use std::collections::HashSet;

    const BUCKET: &str = "test-bucket";

    fn keys(entries: &[ObjectEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Three levels of nesting, 5 objects per folder, 2 subfolders per folder.
    fn nested_backend(page_size: usize) -> (MemoryBackend, usize) {
        let mut backend = MemoryBackend::new().with_page_size(page_size);
        let mut count = 0;
        let mut folders = vec![String::new()];

        for _level in 0..3 {
            let mut next = Vec::new();
            for folder in &folders {
                for i in 0..5 {
                    backend = backend.with_object(BUCKET, format!("{folder}file-{i}.bin"), "x");
                    count += 1;
                }
                for sub in ["alpha/", "beta/"] {
                    next.push(format!("{folder}{sub}"));
                }
            }
            folders = next;
        }

        (backend, count)
    }

    #[tokio::test]
    async fn test_lists_every_object_across_levels() {
        let (backend, count) = nested_backend(1000);
        let lister = NamespaceLister::new(Arc::new(backend), BUCKET);

        let entries = lister.list("").await.unwrap();
        assert_eq!(entries.len(), count);

        let unique: HashSet<_> = keys(&entries).into_iter().collect();
        assert_eq!(unique.len(), count);
    }

    #[tokio::test]
    async fn test_page_size_does_not_change_entry_set() {
        let mut sets = Vec::new();
        for page_size in [1, 2, 3, 7, 1000] {
            let (backend, count) = nested_backend(page_size);
            let lister = NamespaceLister::new(Arc::new(backend), BUCKET);
            let entries = lister.list("").await.unwrap();
            assert_eq!(entries.len(), count, "page size {page_size}");

            let set: HashSet<String> = entries.into_iter().map(|e| e.key).collect();
            sets.push(set);
        }

        assert!(sets.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[tokio::test]
    async fn test_depth_first_page_order() {
        let backend = MemoryBackend::new()
            .with_object(BUCKET, "a.txt", "a")
            .with_object(BUCKET, "m/x.txt", "x")
            .with_object(BUCKET, "m/n/y.txt", "y")
            .with_object(BUCKET, "z.txt", "z");

        // One item per page: sub-prefixes are expanded where they appear
        let lister = NamespaceLister::new(Arc::new(backend.with_page_size(1)), BUCKET);
        let entries = lister.list("").await.unwrap();
        assert_eq!(keys(&entries), vec!["a.txt", "m/n/y.txt", "m/x.txt", "z.txt"]);

        // Single page: all direct contents first, then the sub-prefix
        let backend = MemoryBackend::new()
            .with_object(BUCKET, "a.txt", "a")
            .with_object(BUCKET, "m/x.txt", "x")
            .with_object(BUCKET, "m/n/y.txt", "y")
            .with_object(BUCKET, "z.txt", "z");
        let lister = NamespaceLister::new(Arc::new(backend), BUCKET);
        let entries = lister.list("").await.unwrap();
        assert_eq!(keys(&entries), vec!["a.txt", "z.txt", "m/x.txt", "m/n/y.txt"]);
    }

    #[tokio::test]
    async fn test_empty_intermediate_folders_are_expanded() {
        let backend = MemoryBackend::new().with_object(BUCKET, "a/b/c/d/deep.txt", "deep");
        let backend = Arc::new(backend);
        let lister = NamespaceLister::new(Arc::clone(&backend), BUCKET);

        let entries = lister.list("").await.unwrap();
        assert_eq!(keys(&entries), vec!["a/b/c/d/deep.txt"]);
        // "", "a/", "a/b/", "a/b/c/", "a/b/c/d/"
        assert_eq!(backend.list_calls(), 5);
    }

    #[tokio::test]
    async fn test_folder_markers_are_listed() {
        let backend = MemoryBackend::new()
            .with_object(BUCKET, "docs/", "")
            .with_object(BUCKET, "docs/readme.txt", "hello")
            .with_object(BUCKET, "images/cat.png", "meow");
        let lister = NamespaceLister::new(Arc::new(backend), BUCKET);

        let entries = lister.list("").await.unwrap();
        assert_eq!(
            keys(&entries),
            vec!["docs/", "docs/readme.txt", "images/cat.png"]
        );
        assert!(entries[0].is_folder_marker());
    }

    #[tokio::test]
    async fn test_prefix_scopes_listing() {
        let backend = MemoryBackend::new()
            .with_object(BUCKET, "docs/readme.txt", "hello")
            .with_object(BUCKET, "docs/guide/intro.md", "intro")
            .with_object(BUCKET, "images/cat.png", "meow");
        let lister = NamespaceLister::new(Arc::new(backend), BUCKET);

        let entries = lister.list("docs/").await.unwrap();
        assert_eq!(keys(&entries), vec!["docs/readme.txt", "docs/guide/intro.md"]);

        // Without the trailing delimiter the folder shows up as a common prefix
        let entries = lister.list("docs").await.unwrap();
        assert_eq!(keys(&entries), vec!["docs/readme.txt", "docs/guide/intro.md"]);
    }

    #[tokio::test]
    async fn test_empty_bucket() {
        let backend = MemoryBackend::new().with_bucket(BUCKET);
        let lister = NamespaceLister::new(Arc::new(backend), BUCKET);

        assert!(lister.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sub_prefix_failure_aborts_listing() {
        let backend = MemoryBackend::new()
            .with_object(BUCKET, "ok/file.txt", "ok")
            .with_object(BUCKET, "secret/file.txt", "no")
            .with_failing_prefix("secret/");
        let lister = NamespaceLister::new(Arc::new(backend), BUCKET);

        let err = lister.list("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteListing);
        assert!(err.to_string().contains("secret/"));
    }

    #[tokio::test]
    async fn test_missing_bucket_fails() {
        let lister = NamespaceLister::new(Arc::new(MemoryBackend::new()), "missing");

        let err = lister.list("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteListing);
    }
}
