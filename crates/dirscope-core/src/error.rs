/// Error types for scan requests and cache persistence.
///
/// Granular filesystem errors (permission denied on a single entry, a file
/// vanishing mid-stat) are never surfaced here — the scanner skips them and
/// degrades to a best-effort lower bound. These types cover only
/// request-level preconditions and the durable store.
use std::path::PathBuf;

use thiserror::Error;

/// A scan request was rejected or the whole traversal failed.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The requested root path does not exist at scan start.
    #[error("target path does not exist: {}", path.display())]
    TargetMissing { path: PathBuf },

    /// The requested root path exists but is not a directory.
    #[error("target path is not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// A second scan was requested while one is active. Requests are
    /// rejected rather than queued.
    #[error("a scan is already in progress")]
    AlreadyInProgress,

    /// The traversal failed as a whole (e.g. the target vanished mid-scan).
    #[error("scan failed: {message}")]
    ScanFailed { message: String },
}

/// Writing the durable cache store failed.
///
/// Persistence is best-effort: the session logs this and still returns the
/// in-memory scan result to the caller.
#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("failed to write cache store: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode cache store: {0}")]
    Encode(#[from] serde_json::Error),
}
