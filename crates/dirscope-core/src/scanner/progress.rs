/// Scan progress reporting — events sent from the coordinator thread to the
/// consumer via a crossbeam channel.
use crate::cache::CacheEntry;
use crate::model::FolderRecord;

use std::time::Duration;

/// Throughput snapshot emitted after each completed folder.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Folders finished so far.
    pub completed: usize,
    /// Folders in the job (fixed at enumeration time).
    pub total: usize,
    /// Completed folders per second since the job started.
    pub rate_folders_per_sec: f64,
    /// Estimated seconds remaining. `None` while the rate is still zero.
    pub eta_seconds: Option<f64>,
    /// Bytes accumulated so far, including the target's own loose files.
    pub running_total_bytes: u64,
}

/// Events sent from the coordinator to the consumer.
///
/// Folder results arrive in completion order, which is arbitrary —
/// consumers must apply their own sort once the job terminates.
#[derive(Debug)]
pub enum ScanEvent {
    /// Enumeration finished; `total` folder tasks were submitted.
    Started { total: usize },

    /// The target has no subdirectories at all. Terminal; distinct from an
    /// error so frontends can say "nothing to scan" instead of failing.
    NothingToScan,

    /// One folder finished. `side_cache` is the entry for `record.path`
    /// itself (its own nested breakdown), ready to seed the cache so a later
    /// drill-down is an instant hit.
    Folder {
        record: FolderRecord,
        side_cache: CacheEntry,
    },

    /// Emitted after every `Folder` event.
    Progress(ProgressUpdate),

    /// A non-fatal error on an individual entry. Informational only.
    Error { path: String, message: String },

    /// The whole traversal failed (e.g. the target vanished). Terminal.
    Failed { message: String },

    /// All submitted folders finished. Terminal.
    Completed {
        total_size_bytes: u64,
        elapsed: Duration,
    },

    /// Cancellation was observed; any still-running folder tasks were
    /// allowed to finish but their results were discarded. Terminal.
    Cancelled,
}
