//! bg-fetch CLI
//!
//! Downloads an S3 bucket or folder to a local directory.

use bg_cli_common::{format_bytes, format_number, init_logging};
use bg_error::BgError;
use clap::Parser;
use tracing::error;

mod args;
mod progress;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Logs go to stderr, stdout is reserved for --json
    init_logging(args.log_level)?;

    let stats = match run::execute(&args).await {
        Ok(stats) => stats,
        Err(e) => {
            match e.downcast_ref::<BgError>() {
                Some(bg) => error!(kind = %bg.kind(), error = %e, "Fetch aborted"),
                None => error!(error = %e, "Fetch aborted"),
            }
            return Err(e);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    eprintln!();
    eprintln!(
        "Downloaded {} file(s)",
        format_number(stats.entries_processed() as u64)
    );
    eprintln!("  Folders created:  {}", format_number(stats.folders_created as u64));
    eprintln!("  Files written:    {}", format_number(stats.files_downloaded as u64));
    eprintln!("  Bytes written:    {}", format_bytes(stats.bytes_downloaded));

    if let Some(duration) = stats.duration() {
        eprintln!(
            "  Duration:         {:.2}s",
            duration.num_milliseconds() as f64 / 1000.0
        );

        if let Some(rate) = stats.entries_per_second() {
            eprintln!("  Throughput:       {:.1} entries/sec", rate);
        }
    }

    Ok(())
}
