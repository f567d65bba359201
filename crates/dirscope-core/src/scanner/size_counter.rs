/// Recursive size and file-count aggregation — the fundamental unit of work.
///
/// Built on `jwalk` with `Parallelism::Serial` so one invocation consumes
/// exactly one thread: parallelism across folders belongs to the worker
/// pool, not to individual traversals. jwalk's iterative walk also means
/// arbitrarily deep trees cannot overflow the call stack.
use std::path::Path;

/// Aggregate totals for one directory subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirTotals {
    pub size_bytes: u64,
    pub file_count: u64,
}

/// Sum the sizes and count of all regular files under `root`, recursively.
///
/// Hidden (dot-prefixed) entries are included. Symlinks are never followed
/// and never counted. Any entry that errors on list or stat is silently
/// skipped, so the result is a best-effort lower bound under partial access
/// failure — never an error.
pub fn count(root: &Path) -> DirTotals {
    let mut totals = DirTotals::default();

    let walker = jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .parallelism(jwalk::Parallelism::Serial);

    for entry in walker {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(meta) = entry.metadata() {
            totals.size_bytes += meta.len();
            totals.file_count += 1;
        }
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_bytes(path: &Path, n: usize) {
        let mut f = fs::File::create(path).unwrap();
        f.write_all(&vec![0u8; n]).unwrap();
    }

    #[test]
    fn test_counts_nested_files() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("x").join("y");
        fs::create_dir_all(&nested).unwrap();

        write_bytes(&tmp.path().join("top.bin"), 100);
        write_bytes(&tmp.path().join("x").join("mid.bin"), 200);
        write_bytes(&nested.join("deep.bin"), 300);

        let totals = count(tmp.path());
        assert_eq!(totals.size_bytes, 600);
        assert_eq!(totals.file_count, 3);
    }

    #[test]
    fn test_includes_hidden_entries() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".hidden")).unwrap();
        write_bytes(&tmp.path().join(".hidden").join(".dotfile"), 64);

        let totals = count(tmp.path());
        assert_eq!(totals.file_count, 1);
        assert_eq!(totals.size_bytes, 64);
    }

    #[test]
    fn test_empty_directory_is_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(count(tmp.path()), DirTotals::default());
    }

    #[test]
    fn test_missing_directory_is_zero() {
        let tmp = TempDir::new().unwrap();
        let totals = count(&tmp.path().join("nope"));
        assert_eq!(totals, DirTotals::default());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("target");
        fs::create_dir_all(&target).unwrap();
        write_bytes(&target.join("real.bin"), 500);

        let scanned = tmp.path().join("scanned");
        fs::create_dir_all(&scanned).unwrap();
        std::os::unix::fs::symlink(&target, scanned.join("link_dir")).unwrap();
        std::os::unix::fs::symlink(target.join("real.bin"), scanned.join("link_file")).unwrap();

        // Neither the linked directory's contents nor the linked file count.
        let totals = count(&scanned);
        assert_eq!(totals.size_bytes, 0);
        assert_eq!(totals.file_count, 0);
    }
}
