/// Command-line arguments.
use clap::Parser;
use dirscope_core::settings::{DEFAULT_CACHE_TTL_SECONDS, DEFAULT_WORKERS};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dirscope",
    version,
    about = "Recursive folder-size overview with a persistent scan cache"
)]
pub struct Args {
    /// Directory to scan.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Ignore any cached result for this path and re-scan from scratch.
    #[arg(long)]
    pub refresh: bool,

    /// Disable the scan cache entirely (nothing read, nothing persisted).
    #[arg(long)]
    pub no_cache: bool,

    /// Number of scan workers (clamped to 1-16).
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Cache time-to-live in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECONDS)]
    pub ttl: u64,

    /// Directory for the durable cache store (defaults to the platform
    /// cache directory).
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["dirscope"]);
        assert_eq!(args.path, PathBuf::from("."));
        assert!(!args.refresh);
        assert!(!args.no_cache);
        assert_eq!(args.workers, DEFAULT_WORKERS);
        assert_eq!(args.ttl, DEFAULT_CACHE_TTL_SECONDS);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "dirscope",
            "/data",
            "--refresh",
            "--workers",
            "8",
            "--ttl",
            "60",
        ]);
        assert_eq!(args.path, PathBuf::from("/data"));
        assert!(args.refresh);
        assert_eq!(args.workers, 8);
        assert_eq!(args.ttl, 60);
    }
}
