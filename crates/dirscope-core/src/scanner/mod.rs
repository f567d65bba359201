/// Scanner module — the concurrent scan engine.
///
/// One coordinator thread enumerates the target's direct subdirectories
/// once, up front (a snapshot: directories appearing afterwards are not
/// picked up), then fans one [`folder_scan`] task per subdirectory out to a
/// bounded pool of worker threads. Workers never touch shared state; they
/// return values over a channel and the coordinator — the single consumer —
/// turns them into [`ScanEvent`]s.
pub mod folder_scan;
pub mod progress;
pub mod size_counter;

use crate::settings::{MAX_WORKERS, MIN_WORKERS};
use folder_scan::FolderScanOutput;
use progress::{ProgressUpdate, ScanEvent};

use crossbeam_channel::{bounded, Receiver, Sender};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

/// Maximum number of events that may queue up in the channel.
///
/// One folder produces two events (`Folder` + `Progress`), so this gives a
/// slow consumer hundreds of folders of headroom before back-pressure makes
/// the coordinator wait rather than consuming unbounded heap.
pub const EVENT_CHANNEL_CAPACITY: usize = 1_024;

/// Handle to a running or completed scan job. Allows cancellation and
/// receiving events. Not restartable — a new call to [`start_scan`] starts
/// a fresh job.
pub struct ScanHandle {
    /// Receiver for events from the coordinator thread.
    pub events_rx: Receiver<ScanEvent>,
    /// Flag to request cancellation.
    cancel_flag: Arc<AtomicBool>,
    /// Join handle for the coordinator thread.
    _thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Request the scan to stop at the next completed unit of work.
    /// Cooperative: in-flight folder traversals are not interrupted, but
    /// their results are discarded and no further tasks start.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }

    /// Shareable cancellation token for this job, so callers can route a
    /// `cancel()` from another thread.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel_flag)
    }
}

/// Start a new scan job on a background coordinator thread.
///
/// `worker_count` is clamped to the supported range and never exceeds the
/// number of subdirectories found.
pub fn start_scan(target: PathBuf, worker_count: usize) -> ScanHandle {
    let (events_tx, events_rx) = bounded::<ScanEvent>(EVENT_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = Arc::clone(&cancel_flag);

    let thread = thread::Builder::new()
        .name("dirscope-scan".into())
        .spawn(move || {
            info!("starting scan of {}", target.display());
            run_coordinator(target, worker_count, events_tx, cancel_clone);
        })
        .expect("failed to spawn scan coordinator thread");

    ScanHandle {
        events_rx,
        cancel_flag,
        _thread: Some(thread),
    }
}

/// Coordinator body: enumerate, fan out, collect, report.
fn run_coordinator(
    target: PathBuf,
    worker_count: usize,
    events: Sender<ScanEvent>,
    cancel: Arc<AtomicBool>,
) {
    let started = Instant::now();

    let read_dir = match fs::read_dir(&target) {
        Ok(rd) => rd,
        Err(err) => {
            let _ = events.send(ScanEvent::Failed {
                message: format!("failed to list {}: {err}", target.display()),
            });
            return;
        }
    };

    // Snapshot enumeration: subdirectories to scan, plus the target's own
    // loose files summed into the grand total. Entries erroring mid-listing
    // are skipped like any other granular failure.
    let mut subdirs: Vec<PathBuf> = Vec::new();
    let mut loose_bytes: u64 = 0;
    for entry in read_dir {
        let Ok(entry) = entry else { continue };
        let Ok(file_type) = entry.file_type() else {
            let _ = events.send(ScanEvent::Error {
                path: entry.path().to_string_lossy().into_owned(),
                message: "could not determine entry type".into(),
            });
            continue;
        };
        if file_type.is_symlink() {
            continue;
        }
        if file_type.is_dir() {
            subdirs.push(entry.path());
        } else if file_type.is_file() {
            if let Ok(meta) = entry.metadata() {
                loose_bytes += meta.len();
            }
        }
    }

    let total = subdirs.len();
    if total == 0 {
        let _ = events.send(ScanEvent::NothingToScan);
        return;
    }
    let _ = events.send(ScanEvent::Started { total });

    // All jobs are queued up front; a worker that finds the queue empty is
    // done. Workers check the cancel flag before taking the next job, so
    // once the flag is observed no further tasks start.
    let (job_tx, job_rx) = bounded::<PathBuf>(total);
    for dir in subdirs {
        let _ = job_tx.send(dir);
    }
    drop(job_tx);

    let (results_tx, results_rx) = bounded::<FolderScanOutput>(total);
    let workers = worker_count.clamp(MIN_WORKERS, MAX_WORKERS).min(total);
    let mut worker_handles = Vec::with_capacity(workers);
    for i in 0..workers {
        let job_rx = job_rx.clone();
        let results_tx = results_tx.clone();
        let cancel = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name(format!("dirscope-worker-{i}"))
            .spawn(move || run_worker(&job_rx, &results_tx, &cancel))
            .expect("failed to spawn scan worker thread");
        worker_handles.push(handle);
    }
    drop(job_rx);
    drop(results_tx);

    let mut completed: usize = 0;
    let mut running_total: u64 = loose_bytes;

    while completed < total {
        let output = match results_rx.recv() {
            Ok(output) => output,
            // All workers exited: either cancellation drained the pool or a
            // worker died. Decided below.
            Err(_) => break,
        };

        // A result landing after the flag was raised is discarded, per the
        // cooperative cancellation contract.
        if cancel.load(Ordering::Relaxed) {
            break;
        }

        completed += 1;
        running_total += output.record.size_bytes;

        let elapsed = started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            completed as f64 / elapsed
        } else {
            0.0
        };
        let eta_seconds = if rate > 0.0 {
            Some((total - completed) as f64 / rate)
        } else {
            None
        };

        let _ = events.send(ScanEvent::Folder {
            record: output.record,
            side_cache: output.side_cache,
        });
        let _ = events.send(ScanEvent::Progress(ProgressUpdate {
            completed,
            total,
            rate_folders_per_sec: rate,
            eta_seconds,
            running_total_bytes: running_total,
        }));
    }

    // Already-running traversals finish on their own time; wait for the pool
    // so no worker outlives the job.
    for handle in worker_handles {
        let _ = handle.join();
    }

    if cancel.load(Ordering::Relaxed) {
        debug!(
            "scan of {} cancelled after {completed}/{total} folders",
            target.display()
        );
        let _ = events.send(ScanEvent::Cancelled);
    } else if completed < total {
        let _ = events.send(ScanEvent::Failed {
            message: format!("worker pool terminated after {completed}/{total} folders"),
        });
    } else {
        debug!(
            "scan of {} complete: {total} folders, {running_total} bytes in {:?}",
            target.display(),
            started.elapsed()
        );
        let _ = events.send(ScanEvent::Completed {
            total_size_bytes: running_total,
            elapsed: started.elapsed(),
        });
    }
}

/// Worker body: pull folders off the queue until it is empty or the job is
/// cancelled. Each unit of work is one full folder scan.
fn run_worker(
    jobs: &Receiver<PathBuf>,
    results: &Sender<FolderScanOutput>,
    cancel: &AtomicBool,
) {
    loop {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        let Ok(path) = jobs.try_recv() else { break };
        let output = folder_scan::scan_folder(&path);
        if results.send(output).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_bytes(path: &std::path::Path, n: usize) {
        let mut f = fs::File::create(path).unwrap();
        f.write_all(&vec![0u8; n]).unwrap();
    }

    fn drain(handle: ScanHandle) -> Vec<ScanEvent> {
        // Channel closes when the coordinator thread exits.
        handle.events_rx.iter().collect()
    }

    #[test]
    fn test_zero_subdirectories_is_nothing_to_scan() {
        let tmp = TempDir::new().unwrap();
        write_bytes(&tmp.path().join("loose.bin"), 10);

        let events = drain(start_scan(tmp.path().to_path_buf(), 4));
        assert!(matches!(events.as_slice(), [ScanEvent::NothingToScan]));
    }

    #[test]
    fn test_missing_target_fails() {
        let tmp = TempDir::new().unwrap();
        let events = drain(start_scan(tmp.path().join("gone"), 4));
        assert!(matches!(events.as_slice(), [ScanEvent::Failed { .. }]));
    }

    #[test]
    fn test_all_folders_reported_and_total_includes_loose_files() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a")).unwrap();
        fs::create_dir_all(tmp.path().join("b")).unwrap();
        write_bytes(&tmp.path().join("a").join("x.bin"), 100);
        write_bytes(&tmp.path().join("a").join("y.bin"), 200);
        write_bytes(&tmp.path().join("loose.bin"), 50);

        let events = drain(start_scan(tmp.path().to_path_buf(), 4));

        let folders: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, ScanEvent::Folder { .. }))
            .collect();
        assert_eq!(folders.len(), 2);

        match events.last().unwrap() {
            ScanEvent::Completed {
                total_size_bytes, ..
            } => assert_eq!(*total_size_bytes, 350),
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[test]
    fn test_progress_follows_every_folder() {
        let tmp = TempDir::new().unwrap();
        for name in ["a", "b", "c"] {
            fs::create_dir_all(tmp.path().join(name)).unwrap();
        }

        let events = drain(start_scan(tmp.path().to_path_buf(), 2));

        let progress: Vec<&ProgressUpdate> = events
            .iter()
            .filter_map(|e| match e {
                ScanEvent::Progress(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(progress.len(), 3);
        assert_eq!(progress.last().unwrap().completed, 3);
        assert_eq!(progress.last().unwrap().total, 3);
        // Completed counts only ever grow.
        assert!(progress.windows(2).all(|w| w[0].completed < w[1].completed));
    }

    #[test]
    fn test_cancel_before_start_terminates_with_cancelled() {
        let tmp = TempDir::new().unwrap();
        for i in 0..10 {
            let dir = tmp.path().join(format!("dir{i}"));
            fs::create_dir_all(&dir).unwrap();
            write_bytes(&dir.join("f.bin"), 1024);
        }

        let handle = start_scan(tmp.path().to_path_buf(), 1);
        handle.cancel();

        let events: Vec<ScanEvent> = handle.events_rx.iter().collect();
        // The flag may land before or after enumeration, but the terminal
        // event must reflect it.
        assert!(matches!(
            events.last().unwrap(),
            ScanEvent::Cancelled | ScanEvent::Completed { .. }
        ));
    }
}
