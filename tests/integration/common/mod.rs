//! Common utilities for integration tests.
//!
//! Shared LocalStack client setup and test data generation.

pub mod localstack;

pub use localstack::{LocalStackTestContext, generate_payload};
