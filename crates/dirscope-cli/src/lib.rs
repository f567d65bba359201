/// CLI frontend — argument parsing and result rendering.
///
/// Presentation glue only: builds `Settings` from flags, runs one session
/// scan, and renders the outcome. All scanning and caching logic lives in
/// `dirscope-core`.
pub mod args;
pub mod render;

use anyhow::Context;
use clap::Parser;
use dirscope_core::session::{ScanOutcome, ScanSession};
use dirscope_core::settings::Settings;

use args::Args;

pub fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    // The cache is keyed by absolute path, so resolve before scanning.
    let target = std::fs::canonicalize(&args.path)
        .with_context(|| format!("cannot resolve {}", args.path.display()))?;

    let mut settings = Settings {
        cache_ttl_seconds: args.ttl,
        cache_enabled: !args.no_cache,
        max_workers: args.workers,
        ..Settings::default()
    };
    if let Some(dir) = args.cache_dir {
        settings.cache_directory = dir;
    }

    tracing::debug!(
        "scanning {} with {} workers",
        target.display(),
        settings.effective_workers()
    );

    let session = ScanSession::new(settings);
    let outcome = session
        .scan_with(&target, args.refresh, render::progress_line)
        .with_context(|| format!("scan of {} failed", target.display()))?;

    match outcome {
        ScanOutcome::Completed(result) => render::print_result(&result),
        ScanOutcome::NothingToScan => {
            println!("no subdirectories found under {}", target.display());
        }
        ScanOutcome::Cancelled => println!("scan cancelled"),
    }

    Ok(())
}
