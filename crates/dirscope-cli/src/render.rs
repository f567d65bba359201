/// Terminal rendering: a progress line on stderr while scanning, a result
/// table on stdout when done.
use dirscope_core::model::size::{format_count, format_size};
use dirscope_core::scanner::progress::ProgressUpdate;
use dirscope_core::session::ScanResult;

use std::io::Write;

/// Rewrite the in-place progress line after each completed folder.
pub fn progress_line(update: &ProgressUpdate) {
    let eta = match update.eta_seconds {
        Some(secs) => format!("{secs:.0}s"),
        None => "--".to_string(),
    };
    eprint!(
        "\rscanning {}/{} folders  {:.1}/s  eta {}  {}\x1b[K",
        update.completed,
        update.total,
        update.rate_folders_per_sec,
        eta,
        format_size(update.running_total_bytes),
    );
    let _ = std::io::stderr().flush();
}

/// Print the sorted result table plus a totals footer.
pub fn print_result(result: &ScanResult) {
    // Clear any leftover progress line.
    eprint!("\r\x1b[K");

    println!(
        "{:<32} {:>10} {:>12}  {:<16} {}",
        "NAME", "SIZE", "FILES", "MODIFIED", "PATH"
    );
    for record in &result.children {
        println!(
            "{:<32} {:>10} {:>12}  {:<16} {}",
            record.name,
            format_size(record.size_bytes),
            format_count(record.file_count),
            record.modified.format("%Y-%m-%d %H:%M"),
            record.path.display()
        );
    }

    let source = if result.from_cache {
        " (cached)".to_string()
    } else {
        format!(" in {:.2}s", result.elapsed_seconds)
    };
    println!(
        "\n{} folders, {} total{}",
        result.children.len(),
        format_size(result.total_size_bytes),
        source
    );
}
