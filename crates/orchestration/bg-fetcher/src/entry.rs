//! Namespace entries and the local paths they map to.

use std::path::{Component, Path, PathBuf};

use bg_error::{BgError, Result};

/// Path separator used as the listing delimiter and folder-marker suffix.
pub const DELIMITER: &str = "/";

/// One item in the bucket namespace beneath the requested prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Full key within the bucket, also the relative local output path
    pub key: String,

    /// Size reported by the listing, 0 when the backend omits it
    pub size: u64,
}

impl ObjectEntry {
    /// Create an entry with an unknown size.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: 0,
        }
    }

    /// Set the size reported by the listing.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Whether this entry is a zero-byte "directory" placeholder.
    pub fn is_folder_marker(&self) -> bool {
        self.key.ends_with(DELIMITER)
    }
}

/// One page of a delimiter-scoped listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Immediate-child objects, in backend order
    pub contents: Vec<ObjectEntry>,

    /// Immediate-child pseudo-folders, each ending with the delimiter
    pub common_prefixes: Vec<String>,

    /// Cursor for the next page of the same prefix
    pub next_continuation_token: Option<String>,
}

/// An entry key paired with its destination on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub key: String,
    pub local_path: PathBuf,
}

impl DownloadTarget {
    /// Map `key` onto a path under `root`.
    ///
    /// A leading separator is dropped, so `/logs/a.txt` lands at
    /// `root/logs/a.txt`. Keys that would escape `root` (parent or drive
    /// components) or that are empty are rejected before any filesystem
    /// access.
    pub fn resolve(root: &Path, key: &str) -> Result<Self> {
        if key.is_empty() {
            return Err(invalid_path(key, "empty key"));
        }

        let mut local_path = root.to_path_buf();
        for component in Path::new(key).components() {
            match component {
                Component::Normal(part) => local_path.push(part),
                Component::CurDir | Component::RootDir => {}
                Component::ParentDir => {
                    return Err(invalid_path(key, "parent directory component"));
                }
                Component::Prefix(_) => {
                    return Err(invalid_path(key, "path prefix component"));
                }
            }
        }

        Ok(Self {
            key: key.to_string(),
            local_path,
        })
    }
}

fn invalid_path(key: &str, reason: &str) -> BgError {
    BgError::InvalidPath {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
