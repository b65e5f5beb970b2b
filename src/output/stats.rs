//! Crawl statistics rendering

use crate::state::CrawlReport;
use std::fmt::Write;

/// Renders a report as the multi-line summary printed at the end of a run
///
/// # Arguments
///
/// * `report` - The report to display
pub fn format_report(report: &CrawlReport) -> String {
    let mut out = String::new();

    let heading = if report.cancelled {
        "=== Mirror Interrupted ==="
    } else {
        "=== Mirror Complete ==="
    };
    let _ = writeln!(out, "{}\n", heading);

    let _ = writeln!(out, "Directories explored: {}", report.visited.len());
    let _ = writeln!(out, "  Empty or unreachable: {}", report.empty_directories);
    let _ = writeln!(out);

    let _ = writeln!(out, "Files:");
    let _ = writeln!(
        out,
        "  Downloaded: {} ({} bytes)",
        report.downloaded, report.bytes_written
    );
    let _ = writeln!(out, "  Already present: {}", report.skipped);
    let _ = writeln!(out, "  Failed: {}", report.failed);
    if report.rejected_entries > 0 {
        let _ = writeln!(out, "  Ignored (outside mirror root): {}", report.rejected_entries);
    }
    let _ = writeln!(out);

    let total = report.files_ok() + report.failed;
    let success_rate = if total > 0 {
        (report.files_ok() as f64 / total as f64) * 100.0
    } else {
        100.0
    };
    let _ = write!(
        out,
        "Success Rate: {:.1}% ({} / {} files) in {:.2}s",
        success_rate,
        report.files_ok(),
        total,
        report.elapsed.as_secs_f64()
    );

    out
}

/// Prints a report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("{}", format_report(report));
}
