/// Operator-facing settings consumed by the scan session.
///
/// The core reads these at scan start; it owns no settings UI. The struct
/// (de)serializes so frontends can persist it however they like.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default cache entry time-to-live.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;

/// Default number of scan workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Worker pool bounds. Values outside this range are clamped, not rejected.
pub const MIN_WORKERS: usize = 1;
pub const MAX_WORKERS: usize = 16;

/// File name of the durable cache store inside `cache_directory`.
pub const CACHE_STORE_FILE: &str = "scan_cache.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding the durable cache store.
    #[serde(default = "default_cache_directory")]
    pub cache_directory: PathBuf,

    /// Maximum age of a cache entry before a lookup triggers a re-scan.
    #[serde(default = "default_ttl")]
    pub cache_ttl_seconds: u64,

    /// When false, every scan hits the filesystem and nothing is persisted.
    #[serde(default = "default_true")]
    pub cache_enabled: bool,

    /// Requested worker pool size. Clamped to `MIN_WORKERS..=MAX_WORKERS`
    /// by [`Settings::effective_workers`].
    #[serde(default = "default_workers")]
    pub max_workers: usize,
}

fn default_cache_directory() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("dirscope"))
        .unwrap_or_else(|| PathBuf::from(".dirscope-cache"))
}

fn default_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECONDS
}

fn default_true() -> bool {
    true
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cache_directory: default_cache_directory(),
            cache_ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
            cache_enabled: true,
            max_workers: DEFAULT_WORKERS,
        }
    }
}

impl Settings {
    /// Worker count actually used by the pool, clamped to the supported range.
    pub fn effective_workers(&self) -> usize {
        self.max_workers.clamp(MIN_WORKERS, MAX_WORKERS)
    }

    /// Full path of the durable cache store.
    pub fn cache_store_path(&self) -> PathBuf {
        self.cache_directory.join(CACHE_STORE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_workers_clamps() {
        let mut settings = Settings::default();
        assert_eq!(settings.effective_workers(), DEFAULT_WORKERS);

        settings.max_workers = 0;
        assert_eq!(settings.effective_workers(), MIN_WORKERS);

        settings.max_workers = 64;
        assert_eq!(settings.effective_workers(), MAX_WORKERS);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.cache_ttl_seconds, DEFAULT_CACHE_TTL_SECONDS);
        assert_eq!(settings.max_workers, DEFAULT_WORKERS);
        assert!(settings.cache_enabled);
    }

    #[test]
    fn test_cache_store_path() {
        let settings = Settings {
            cache_directory: PathBuf::from("/tmp/cache"),
            ..Settings::default()
        };
        assert_eq!(
            settings.cache_store_path(),
            PathBuf::from("/tmp/cache").join(CACHE_STORE_FILE)
        );
    }
}
