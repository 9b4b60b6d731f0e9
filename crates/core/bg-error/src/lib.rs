//! Error types for bucket-grab.
//!
//! This crate provides:
//! - [`BgError`] - Top-level error enum for listing and download failures
//! - [`ErrorKind`] - Coarse classification used for reporting and exit handling

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for bucket-grab.
#[derive(Error, Debug)]
pub enum BgError {
    /// A paginated listing request failed (network, auth, missing bucket)
    #[error("Listing failed for prefix '{prefix}': {message}")]
    Listing { prefix: String, message: String },

    /// Opening or streaming an object's bytes failed
    #[error("Failed to read s3 object '{key}': {message}")]
    RemoteRead { key: String, message: String },

    /// Creating a directory or writing a file failed
    #[error("Failed to write {}: {source}", .path.display())]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The object key cannot be mapped onto a path under the destination root
    #[error("Refusing to materialize key '{key}': {reason}")]
    InvalidPath { key: String, reason: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (wrapped anyhow)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse error classification.
///
/// `InvalidPath` is reported as a [`ErrorKind::LocalWrite`] since it is a
/// destination-side failure detected before any I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    RemoteListing,
    RemoteRead,
    LocalWrite,
    Config,
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RemoteListing => write!(f, "RemoteListing"),
            Self::RemoteRead => write!(f, "RemoteRead"),
            Self::LocalWrite => write!(f, "LocalWrite"),
            Self::Config => write!(f, "Config"),
            Self::Other => write!(f, "Other"),
        }
    }
}

impl BgError {
    /// Build a listing error for the given prefix.
    pub fn listing(prefix: impl Into<String>, message: impl ToString) -> Self {
        Self::Listing {
            prefix: prefix.into(),
            message: message.to_string(),
        }
    }

    /// Build a remote read error for the given key.
    pub fn remote_read(key: impl Into<String>, message: impl ToString) -> Self {
        Self::RemoteRead {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Build a local write error for the given path.
    pub fn local_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalWrite {
            path: path.into(),
            source,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Listing { .. } => ErrorKind::RemoteListing,
            Self::RemoteRead { .. } => ErrorKind::RemoteRead,
            Self::LocalWrite { .. } | Self::InvalidPath { .. } => ErrorKind::LocalWrite,
            Self::Config(_) => ErrorKind::Config,
            Self::Other(_) => ErrorKind::Other,
        }
    }
}

/// Result type alias using BgError.
pub type Result<T> = std::result::Result<T, BgError>;
