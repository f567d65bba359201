/// One scanned directory's summary.
///
/// Records are immutable value data: a new scan produces new records, never
/// mutates old ones in place. Copies flow into both the caller-facing result
/// list and the cache, so there is no shared mutable ownership anywhere.
use chrono::{DateTime, Local};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderRecord {
    /// Leaf name only (NOT the full path).
    pub name: CompactString,

    /// Absolute path of the directory.
    pub path: PathBuf,

    /// Total bytes of all regular files under this directory, recursively.
    /// A best-effort lower bound: entries that error on list/stat are skipped.
    pub size_bytes: u64,

    /// Number of regular files under this directory, recursively.
    pub file_count: u64,

    /// Last-modified time of the directory entry itself, not its contents.
    pub modified: DateTime<Local>,
}

/// Sort records the way every consumer expects them: descending by size,
/// with name as a tie-breaker so repeated scans of an unchanged tree yield
/// an identical ordering.
pub fn sort_by_size_desc(records: &mut [FolderRecord]) {
    records.sort_unstable_by(|a, b| {
        b.size_bytes
            .cmp(&a.size_bytes)
            .then_with(|| a.name.cmp(&b.name))
    });
}
