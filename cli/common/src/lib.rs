//! Shared utilities for bucket-grab CLI binaries.
//!
//! Logging setup, common argument types and human-readable formatting.

pub mod args;
pub mod format;
pub mod logging;

pub use args::{LogLevel, parse_positive_usize};
pub use format::{format_bytes, format_number};
pub use logging::init_logging;
