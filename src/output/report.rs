//! Human-readable end-of-run report

use crate::fetcher::RunReport;
use crate::state::RunState;

/// Formats the final report shown after a run
pub fn format_report(report: &RunReport) -> String {
    let stats = &report.statistics;
    let mut out = String::new();

    out.push_str(&"-".repeat(80));
    out.push('\n');
    if report.state == RunState::Interrupted {
        out.push_str("Interrupted by user\n");
    }
    out.push_str(&format!(
        "Completed in {:.2} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    out.push_str(&format!(
        "Attempted: {} of {}\n",
        stats.total_attempted,
        stats.range_len()
    ));
    out.push_str(&format!("Successful: {}\n", stats.successful));
    out.push_str(&format!("Failed: {}\n", stats.failed));
    if stats.persist_failures > 0 {
        out.push_str(&format!(
            "Records not persisted: {}\n",
            stats.persist_failures
        ));
    }
    out.push_str(&format!("Success rate: {:.2}%\n", stats.success_rate()));
    out.push_str(&format!("\nSummary saved to {}\n", report.summary_path.display()));

    out
}

/// Prints the final report to stdout
pub fn print_report(report: &RunReport) {
    print!("{}", format_report(report));
}
