/// Scan cache — keyed store mapping absolute directory paths to their last
/// scan result plus a capture timestamp.
///
/// Two tiers feed this map: a completed scan writes the entry for its target
/// path, and each worker additionally produces a *side-cache* entry for the
/// child it scanned (the child's own nested breakdown), so a later drill-down
/// into that child is an instant hit instead of a fresh traversal.
///
/// TTL is evaluated at lookup time only — there is no background sweep, and
/// stale entries remain until overwritten or explicitly cleared.
pub mod store;

use crate::error::CacheStoreError;
use crate::model::FolderRecord;

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A cache slot: the immediate subdirectories of the keyed path, sorted
/// descending by size, plus the totals for the keyed path as a whole.
///
/// Invariant: `total_size_bytes >= sum of children sizes`; the difference is
/// attributable to files directly inside the keyed path ("loose files").
/// Entries are replaced wholesale, never partially mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Immediate subdirectories of the keyed path, descending by size.
    pub children: Vec<FolderRecord>,

    /// Unix epoch seconds at which this entry was produced.
    pub captured_at: i64,

    /// Total bytes under the keyed path, including its loose files.
    pub total_size_bytes: u64,

    /// Convenience: `children.len()` at capture time.
    pub child_count: usize,
}

impl CacheEntry {
    /// Build an entry captured now.
    pub fn new(children: Vec<FolderRecord>, total_size_bytes: u64) -> Self {
        let child_count = children.len();
        Self {
            children,
            captured_at: chrono::Utc::now().timestamp(),
            total_size_bytes,
            child_count,
        }
    }

    /// Bytes of files sitting directly inside the keyed path.
    ///
    /// Derived as `total - sum(children)`. If only one cache layer was
    /// refreshed since capture the figure can be stale; the subtraction
    /// saturates so a divergence never produces a wrapped value.
    pub fn loose_file_bytes(&self) -> u64 {
        let child_sum: u64 = self.children.iter().map(|c| c.size_bytes).sum();
        self.total_size_bytes.saturating_sub(child_sum)
    }
}

/// In-memory mapping with optional durable persistence.
#[derive(Debug, Default)]
pub struct ScanCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl ScanCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True iff an entry exists for `path` and is younger than `ttl_seconds`.
    pub fn is_valid(&self, path: &Path, ttl_seconds: u64) -> bool {
        self.is_valid_at(path, ttl_seconds, chrono::Utc::now().timestamp())
    }

    /// TTL check against an explicit clock. Exposed so the freshness boundary
    /// can be tested without sleeping.
    pub fn is_valid_at(&self, path: &Path, ttl_seconds: u64, now: i64) -> bool {
        self.entries
            .get(path)
            .map(|entry| now.saturating_sub(entry.captured_at) < ttl_seconds as i64)
            .unwrap_or(false)
    }

    pub fn get(&self, path: &Path) -> Option<&CacheEntry> {
        self.entries.get(path)
    }

    /// Total replacement of the slot for `path` — never merges partial data.
    pub fn put(&mut self, path: PathBuf, entry: CacheEntry) {
        self.entries.insert(path, entry);
    }

    pub fn remove(&mut self, path: &Path) -> Option<CacheEntry> {
        self.entries.remove(path)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Load the cache from its durable store.
    ///
    /// A missing or unreadable store fails open to an empty cache — never
    /// fatal. Corruption is logged and otherwise ignored.
    pub fn load(store_path: &Path) -> Self {
        let text = match fs::read_to_string(store_path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::new(),
            Err(err) => {
                warn!("cache store unreadable, starting empty: {err}");
                return Self::new();
            }
        };

        match serde_json::from_str::<BTreeMap<String, store::StoredEntry>>(&text) {
            Ok(stored) => {
                let entries = stored
                    .into_iter()
                    .map(|(path, entry)| (PathBuf::from(path), entry.into_entry()))
                    .collect();
                Self { entries }
            }
            Err(err) => {
                warn!("cache store corrupt, starting empty: {err}");
                Self::new()
            }
        }
    }

    /// Persist the full mapping as a whole-file replacement.
    ///
    /// Writes to a temp file and renames over the store so a crash mid-write
    /// never leaves a truncated document. Callers must serialize concurrent
    /// saves; the session does so by holding its cache lock across the write.
    pub fn save(&self, store_path: &Path) -> Result<(), CacheStoreError> {
        if let Some(parent) = store_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stored: BTreeMap<String, store::StoredEntry> = self
            .entries
            .iter()
            .map(|(path, entry)| {
                (
                    path.to_string_lossy().into_owned(),
                    store::StoredEntry::from_entry(entry),
                )
            })
            .collect();

        let json = serde_json::to_string_pretty(&stored)?;
        let tmp = store_path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, store_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use compact_str::CompactString;
    use tempfile::TempDir;

    fn record(name: &str, size: u64, files: u64) -> FolderRecord {
        FolderRecord {
            name: CompactString::new(name),
            path: PathBuf::from("/data").join(name),
            size_bytes: size,
            file_count: files,
            modified: Local::now(),
        }
    }

    fn entry(children: Vec<FolderRecord>, total: u64) -> CacheEntry {
        CacheEntry::new(children, total)
    }

    #[test]
    fn test_put_get_replaces_wholesale() {
        let mut cache = ScanCache::new();
        let key = PathBuf::from("/data");

        cache.put(key.clone(), entry(vec![record("a", 10, 1)], 10));
        cache.put(key.clone(), entry(vec![record("b", 20, 2)], 20));

        let got = cache.get(&key).unwrap();
        assert_eq!(got.children.len(), 1);
        assert_eq!(got.children[0].name, "b");
        assert_eq!(got.total_size_bytes, 20);
    }

    #[test]
    fn test_ttl_boundary_with_fixed_clock() {
        let mut cache = ScanCache::new();
        let key = PathBuf::from("/data");
        let captured_at = 1_000_000;
        let ttl = 3600u64;

        let mut e = entry(vec![], 0);
        e.captured_at = captured_at;
        cache.put(key.clone(), e);

        assert!(cache.is_valid_at(&key, ttl, captured_at + ttl as i64 - 1));
        assert!(!cache.is_valid_at(&key, ttl, captured_at + ttl as i64));
        assert!(!cache.is_valid_at(&key, ttl, captured_at + ttl as i64 + 1));
    }

    #[test]
    fn test_is_valid_absent_key() {
        let cache = ScanCache::new();
        assert!(!cache.is_valid(Path::new("/nope"), 3600));
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut cache = ScanCache::new();
        cache.put(PathBuf::from("/a"), entry(vec![], 0));
        cache.put(PathBuf::from("/b"), entry(vec![], 0));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_loose_file_bytes() {
        let e = entry(vec![record("a", 300, 2), record("b", 0, 0)], 350);
        assert_eq!(e.loose_file_bytes(), 50);

        // A stale total smaller than the child sum saturates to zero instead
        // of wrapping.
        let stale = entry(vec![record("a", 300, 2)], 100);
        assert_eq!(stale.loose_file_bytes(), 0);
    }

    #[test]
    fn test_save_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = tmp.path().join("scan_cache.json");

        let mut cache = ScanCache::new();
        cache.put(
            PathBuf::from("/data"),
            entry(vec![record("a", 300, 2), record("b", 0, 0)], 350),
        );
        cache.put(PathBuf::from("/data/a"), entry(vec![], 300));
        cache.save(&store).unwrap();

        let loaded = ScanCache::load(&store);
        assert_eq!(loaded.len(), 2);
        assert_eq!(
            loaded.get(Path::new("/data")),
            cache.get(Path::new("/data"))
        );
        assert_eq!(
            loaded.get(Path::new("/data/a")),
            cache.get(Path::new("/data/a"))
        );
    }

    #[test]
    fn test_load_missing_store_is_empty() {
        let tmp = TempDir::new().unwrap();
        let cache = ScanCache::load(&tmp.path().join("does_not_exist.json"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_corrupt_store_fails_open() {
        let tmp = TempDir::new().unwrap();
        let store = tmp.path().join("scan_cache.json");
        fs::write(&store, "{ this is not json").unwrap();

        let cache = ScanCache::load(&store);
        assert!(cache.is_empty());
    }
}
