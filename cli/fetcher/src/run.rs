//! Main execution logic for bg-fetch CLI.

use std::sync::Arc;

use anyhow::Result;
use bg_fetcher::{FetchConfig, FetchStats, Fetcher, S3Backend, S3Config, create_s3_client};
use tracing::info;

use crate::args::Cli;
use crate::progress::ProgressBar;

/// Build the S3 configuration from CLI arguments.
pub fn s3_config(args: &Cli) -> S3Config {
    let mut s3_config = S3Config::new(&args.bucket)
        .with_region(&args.region)
        .with_credentials(&args.access_key_id, &args.secret_access_key)
        .with_timeout(args.timeout_secs);

    if let Some(prefix) = args.prefix() {
        s3_config = s3_config.with_prefix(prefix);
    }

    if let Some(endpoint) = &args.endpoint {
        s3_config = s3_config.with_endpoint(endpoint);
    }

    s3_config
}

/// Build the fetch configuration from CLI arguments.
pub fn fetch_config(args: &Cli) -> FetchConfig {
    FetchConfig::new()
        .with_destination(&args.output)
        .with_concurrency(args.concurrency)
}

/// Execute the fetch with the provided arguments.
pub async fn execute(args: &Cli) -> Result<FetchStats> {
    let s3_config = s3_config(args);
    let client = create_s3_client(&s3_config).await?;

    info!(
        bucket = %s3_config.bucket,
        prefix = ?s3_config.prefix,
        destination = %args.output.display(),
        "Fetching bucket"
    );

    let fetcher = Fetcher::new(
        Arc::new(S3Backend::new(client)),
        &s3_config.bucket,
        s3_config.prefix.clone(),
        fetch_config(args),
    );

    let progress = ProgressBar::new(!args.no_progress);
    let stats = fetcher.run(&progress).await?;

    Ok(stats)
}
