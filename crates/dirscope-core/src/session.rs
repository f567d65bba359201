/// Scan session — orchestrates one end-to-end scan request.
///
/// State machine: Idle → CacheCheck → CacheHit | CacheMiss → Scanning →
/// Completed / Cancelled / Failed → Idle. Only one scan may be active at a
/// time; a second request is rejected immediately, never queued.
///
/// The session is the single consumer of scanner events: workers produce
/// values, the coordinator forwards them over a channel, and only this type
/// touches the shared cache — side-cache entries for the target's children
/// first, then the parent entry, then one durable save.
use crate::cache::{CacheEntry, ScanCache};
use crate::error::ScanError;
use crate::model::folder_record::sort_by_size_desc;
use crate::model::FolderRecord;
use crate::scanner::progress::{ProgressUpdate, ScanEvent};
use crate::scanner::{self, ScanHandle};
use crate::settings::Settings;

use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Terminal result of a scan request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    /// Immediate subdirectories of the target, descending by size.
    pub children: Vec<FolderRecord>,
    /// Total bytes under the target, including its loose files.
    pub total_size_bytes: u64,
    /// Wall-clock scan duration; ~0 for cache hits.
    pub elapsed_seconds: f64,
    /// True when the result was served from the cache without touching the
    /// filesystem.
    pub from_cache: bool,
}

/// How a scan request ended. Cancellation is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Completed(ScanResult),
    /// Cancelled cooperatively; partial results were discarded and the
    /// cache was left untouched.
    Cancelled,
    /// The target exists but has no subdirectories. Nothing was cached.
    NothingToScan,
}

pub struct ScanSession {
    settings: Settings,
    cache: Mutex<ScanCache>,
    scanning: AtomicBool,
    /// Cancellation token of the scan currently in flight, if any.
    active_cancel: Mutex<Option<Arc<AtomicBool>>>,
}

impl ScanSession {
    /// Create a session, loading the durable cache store if caching is
    /// enabled. A missing or corrupt store starts empty.
    pub fn new(settings: Settings) -> Self {
        let cache = if settings.cache_enabled {
            ScanCache::load(&settings.cache_store_path())
        } else {
            ScanCache::new()
        };
        Self {
            settings,
            cache: Mutex::new(cache),
            scanning: AtomicBool::new(false),
            active_cancel: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Snapshot of the cache entry for `path`, if any. Intended for
    /// frontends showing cache state and for tests.
    pub fn cached_entry(&self, path: &Path) -> Option<CacheEntry> {
        self.cache.lock().get(path).cloned()
    }

    /// Drop every cache entry, in memory and (best-effort) on disk.
    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        cache.clear();
        if self.settings.cache_enabled {
            if let Err(err) = cache.save(&self.settings.cache_store_path()) {
                warn!("failed to persist cleared cache: {err}");
            }
        }
    }

    /// Request cancellation of the scan in progress. No-op when idle.
    pub fn cancel(&self) {
        if let Some(flag) = self.active_cancel.lock().as_ref() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Run one scan request without progress reporting.
    pub fn scan(&self, path: &Path, force_refresh: bool) -> Result<ScanOutcome, ScanError> {
        self.scan_with(path, force_refresh, |_| {})
    }

    /// Run one scan request, invoking `on_progress` after each completed
    /// folder. The callback runs on the caller's thread.
    pub fn scan_with<F>(
        &self,
        path: &Path,
        force_refresh: bool,
        mut on_progress: F,
    ) -> Result<ScanOutcome, ScanError>
    where
        F: FnMut(&ProgressUpdate),
    {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ScanError::AlreadyInProgress);
        }
        let _guard = ActiveScanGuard { session: self };

        // Request-level preconditions: checked before any worker spawns.
        let meta = fs::metadata(path).map_err(|_| ScanError::TargetMissing {
            path: path.to_path_buf(),
        })?;
        if !meta.is_dir() {
            return Err(ScanError::NotADirectory {
                path: path.to_path_buf(),
            });
        }

        if force_refresh {
            // Evict before scanning so the miss cannot accidentally hit a
            // just-invalidated entry.
            self.cache.lock().remove(path);
        } else if self.settings.cache_enabled {
            let cache = self.cache.lock();
            if cache.is_valid(path, self.settings.cache_ttl_seconds) {
                if let Some(entry) = cache.get(path) {
                    debug!("cache hit for {}", path.display());
                    return Ok(ScanOutcome::Completed(ScanResult {
                        children: entry.children.clone(),
                        total_size_bytes: entry.total_size_bytes,
                        elapsed_seconds: 0.0,
                        from_cache: true,
                    }));
                }
            }
        }

        let handle = scanner::start_scan(path.to_path_buf(), self.settings.effective_workers());
        *self.active_cancel.lock() = Some(handle.cancel_token());

        self.drain_events(path, &handle, &mut on_progress)
    }

    /// Consume coordinator events until a terminal one arrives, staging
    /// results and committing them on completion.
    fn drain_events<F>(
        &self,
        path: &Path,
        handle: &ScanHandle,
        on_progress: &mut F,
    ) -> Result<ScanOutcome, ScanError>
    where
        F: FnMut(&ProgressUpdate),
    {
        let mut children: Vec<FolderRecord> = Vec::new();
        let mut side_entries: Vec<(PathBuf, CacheEntry)> = Vec::new();

        for event in handle.events_rx.iter() {
            match event {
                ScanEvent::Started { total } => {
                    debug!("scanning {total} folders under {}", path.display());
                }
                ScanEvent::NothingToScan => return Ok(ScanOutcome::NothingToScan),
                ScanEvent::Folder { record, side_cache } => {
                    side_entries.push((record.path.clone(), side_cache));
                    children.push(record);
                }
                ScanEvent::Progress(update) => on_progress(&update),
                ScanEvent::Error { path, message } => {
                    debug!("skipped {path}: {message}");
                }
                ScanEvent::Failed { message } => {
                    return Err(ScanError::ScanFailed { message });
                }
                ScanEvent::Cancelled => return Ok(ScanOutcome::Cancelled),
                ScanEvent::Completed {
                    total_size_bytes,
                    elapsed,
                } => {
                    // The flag may have been raised after the last unit of
                    // work finished; honor it rather than committing.
                    if handle.is_cancelled() {
                        return Ok(ScanOutcome::Cancelled);
                    }

                    sort_by_size_desc(&mut children);
                    if self.settings.cache_enabled {
                        self.commit(path, &children, total_size_bytes, side_entries);
                    }
                    return Ok(ScanOutcome::Completed(ScanResult {
                        children,
                        total_size_bytes,
                        elapsed_seconds: elapsed.as_secs_f64(),
                        from_cache: false,
                    }));
                }
            }
        }

        // Coordinator exited without a terminal event — treat as failure.
        Err(ScanError::ScanFailed {
            message: "scan ended without a terminal event".into(),
        })
    }

    /// Commit a completed scan: side-cache entries for each child, the
    /// parent entry, then one durable save. Holding the lock across the save
    /// serializes concurrent persistence.
    fn commit(
        &self,
        path: &Path,
        children: &[FolderRecord],
        total_size_bytes: u64,
        side_entries: Vec<(PathBuf, CacheEntry)>,
    ) {
        let mut cache = self.cache.lock();
        for (child_path, entry) in side_entries {
            cache.put(child_path, entry);
        }
        cache.put(
            path.to_path_buf(),
            CacheEntry::new(children.to_vec(), total_size_bytes),
        );
        // Durability is best-effort: a failed write is logged and the scan
        // result is still returned in memory.
        if let Err(err) = cache.save(&self.settings.cache_store_path()) {
            warn!("failed to persist scan cache: {err}");
        }
    }
}

/// Resets the single-flight flag and drops the cancellation token on every
/// exit path of `scan_with`.
struct ActiveScanGuard<'a> {
    session: &'a ScanSession,
}

impl Drop for ActiveScanGuard<'_> {
    fn drop(&mut self) {
        *self.session.active_cancel.lock() = None;
        self.session.scanning.store(false, Ordering::SeqCst);
    }
}
