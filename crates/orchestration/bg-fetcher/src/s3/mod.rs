//! S3 client and backend.
//!
//! This module provides:
//! - Client configuration with custom endpoint support
//! - A [`crate::StorageBackend`] over `ListObjectsV2` / `GetObject`

mod backend;
mod client;

pub use backend::S3Backend;
pub use client::{S3Config, create_s3_client};
