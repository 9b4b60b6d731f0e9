//! CLI argument definitions for bg-fetch.

use std::path::PathBuf;

use bg_cli_common::{LogLevel, parse_positive_usize};
use clap::Parser;

/// Download an S3 bucket, or one folder of it, to a local directory.
///
/// The whole namespace under the folder is listed first, then every object is
/// downloaded in listing order, recreating the bucket's folder hierarchy under
/// the output directory.
///
/// ## Examples
///
/// Whole bucket into the current directory:
///   bg-fetch -a AKIA... -s SECRET -b my-bucket
///
/// One folder into ./backup:
///   bg-fetch -a AKIA... -s SECRET -b my-bucket -f reports/2024/ -o ./backup
///
/// Against LocalStack with four parallel downloads:
///   bg-fetch -a test -s test -b my-bucket --endpoint http://localhost:4566 --concurrency 4
#[derive(Parser, Debug)]
#[command(name = "bg-fetch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    // === Credentials ===
    /// S3 access key ID
    #[arg(short = 'a', long = "accessKeyId", visible_alias = "access-key-id")]
    pub access_key_id: String,

    /// S3 secret access key
    #[arg(short = 's', long = "secretAccessKey", visible_alias = "secret-access-key")]
    pub secret_access_key: String,

    // === Source ===
    /// S3 bucket name
    #[arg(short, long)]
    pub bucket: String,

    /// Folder (key prefix) to download; the whole bucket when omitted
    #[arg(short, long)]
    pub folder: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Custom S3 endpoint URL (LocalStack, MinIO, R2)
    #[arg(long, env = "BG_S3_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Connect and read timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    // === Destination ===
    /// Directory that mirrors the bucket root
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Maximum concurrent downloads (must be >= 1; 1 keeps downloads strictly sequential)
    #[arg(long, default_value = "1", value_parser = parse_positive_usize)]
    pub concurrency: usize,

    // === Reporting ===
    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Print final statistics as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

impl Cli {
    /// The folder prefix, with an empty string treated as the bucket root.
    pub fn prefix(&self) -> Option<&str> {
        self.folder.as_deref().filter(|folder| !folder.is_empty())
    }
}
