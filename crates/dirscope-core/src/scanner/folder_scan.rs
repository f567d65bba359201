/// Per-folder scan task: summarize one immediate child of the scan target.
///
/// Lists the folder's direct children once. Each direct subdirectory gets a
/// full [`size_counter`] pass and becomes a [`FolderRecord`]; direct files
/// are summed as loose bytes. Besides the record describing the folder as a
/// whole, the task returns a ready-made [`CacheEntry`] for the folder — the
/// side-cache that turns a later drill-down into a cache hit.
use crate::cache::CacheEntry;
use crate::model::folder_record::sort_by_size_desc;
use crate::model::FolderRecord;
use crate::scanner::size_counter;

use chrono::{DateTime, Local};
use compact_str::CompactString;
use std::fs;
use std::path::Path;

/// Result of scanning one folder.
pub struct FolderScanOutput {
    /// Summary of the folder as a whole (total size, recursive file count).
    pub record: FolderRecord,
    /// Cache entry for the folder itself, keyed by `record.path`.
    pub side_cache: CacheEntry,
}

/// Scan `path` and produce its summary record plus side-cache entry.
///
/// A folder that cannot be listed at all (permission denied, vanished)
/// yields a zero-size record rather than an error — one bad folder must
/// never fail the whole job.
pub fn scan_folder(path: &Path) -> FolderScanOutput {
    let name = leaf_name(path);
    let modified = entry_mtime(path);

    let mut children: Vec<FolderRecord> = Vec::new();
    let mut loose_bytes: u64 = 0;
    let mut loose_files: u64 = 0;

    if let Ok(read_dir) = fs::read_dir(path) {
        for entry in read_dir.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                let sub_path = entry.path();
                let totals = size_counter::count(&sub_path);
                let sub_modified = entry
                    .metadata()
                    .ok()
                    .and_then(|m| m.modified().ok())
                    .map(DateTime::<Local>::from)
                    .unwrap_or_else(Local::now);
                children.push(FolderRecord {
                    name: CompactString::new(entry.file_name().to_string_lossy()),
                    path: sub_path,
                    size_bytes: totals.size_bytes,
                    file_count: totals.file_count,
                    modified: sub_modified,
                });
            } else if file_type.is_file() {
                if let Ok(meta) = entry.metadata() {
                    loose_bytes += meta.len();
                    loose_files += 1;
                }
            }
        }
    }

    sort_by_size_desc(&mut children);

    let total_size: u64 = loose_bytes + children.iter().map(|c| c.size_bytes).sum::<u64>();
    let total_files: u64 = loose_files + children.iter().map(|c| c.file_count).sum::<u64>();

    let record = FolderRecord {
        name,
        path: path.to_path_buf(),
        size_bytes: total_size,
        file_count: total_files,
        modified,
    };
    let side_cache = CacheEntry::new(children, total_size);

    FolderScanOutput { record, side_cache }
}

fn leaf_name(path: &Path) -> CompactString {
    path.file_name()
        .map(|n| CompactString::new(n.to_string_lossy()))
        .unwrap_or_else(|| CompactString::new(path.to_string_lossy()))
}

/// Mtime of the directory entry itself, not its contents. Falls back to now
/// when the stat fails so a record is always produced.
fn entry_mtime(path: &Path) -> DateTime<Local> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Local>::from)
        .unwrap_or_else(|_| Local::now())
}
