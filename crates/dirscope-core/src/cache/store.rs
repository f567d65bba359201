/// On-disk representation of the scan cache.
///
/// The durable document is a JSON object keyed by absolute path:
///
/// ```json
/// {
///   "/data": {
///     "children": [
///       { "name": "a", "size_gb": 0.0, "size_mb": 0.0, "files": 2,
///         "modified": "2024-05-01T09:30:00+02:00", "path": "/data/a",
///         "size_bytes": 300 }
///     ],
///     "timestamp": 1714548600,
///     "total_size": 350,
///     "subdirs_count": 1
///   }
/// }
/// ```
///
/// `size_gb` / `size_mb` are presentation conveniences recomputed on every
/// save; `size_bytes` and the RFC 3339 `modified` string are authoritative,
/// so the document round-trips losslessly through save/load.
use crate::model::size::{gigabytes, megabytes};
use crate::model::FolderRecord;

use chrono::{DateTime, Local};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

use super::CacheEntry;

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredEntry {
    pub children: Vec<StoredChild>,
    pub timestamp: i64,
    pub total_size: u64,
    pub subdirs_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredChild {
    pub name: String,
    pub size_gb: f64,
    pub size_mb: f64,
    pub files: u64,
    pub modified: String,
    pub path: String,
    pub size_bytes: u64,
}

impl StoredEntry {
    pub(crate) fn from_entry(entry: &CacheEntry) -> Self {
        Self {
            children: entry.children.iter().map(StoredChild::from_record).collect(),
            timestamp: entry.captured_at,
            total_size: entry.total_size_bytes,
            subdirs_count: entry.child_count,
        }
    }

    pub(crate) fn into_entry(self) -> CacheEntry {
        let children: Vec<FolderRecord> = self
            .children
            .into_iter()
            .filter_map(StoredChild::into_record)
            .collect();
        let child_count = children.len();
        CacheEntry {
            children,
            captured_at: self.timestamp,
            total_size_bytes: self.total_size,
            child_count,
        }
    }
}

impl StoredChild {
    fn from_record(record: &FolderRecord) -> Self {
        Self {
            name: record.name.to_string(),
            size_gb: gigabytes(record.size_bytes),
            size_mb: megabytes(record.size_bytes),
            files: record.file_count,
            modified: record.modified.to_rfc3339(),
            path: record.path.to_string_lossy().into_owned(),
            size_bytes: record.size_bytes,
        }
    }

    /// A child with an unparseable timestamp is dropped rather than failing
    /// the whole load — the cache fails open.
    fn into_record(self) -> Option<FolderRecord> {
        let modified = match DateTime::parse_from_rfc3339(&self.modified) {
            Ok(dt) => dt.with_timezone(&Local),
            Err(err) => {
                warn!("dropping cached record {}: bad timestamp: {err}", self.path);
                return None;
            }
        };
        Some(FolderRecord {
            name: CompactString::new(&self.name),
            path: PathBuf::from(self.path),
            size_bytes: self.size_bytes,
            file_count: self.files,
            modified,
        })
    }
}
