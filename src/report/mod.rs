// src/report/mod.rs
// =============================================================================
// This module turns the finished results into something a human can read.
//
// Sinks:
// - json: writes the full result list to a JSON file (the durable artifact)
// - terminal: prints a table (or JSON) plus a summary to stdout
// - comparison: the --compare-prod result, as a JSON file and a summary
//
// The crawl engine never looks inside a report. It hands the complete
// result list to each sink and only cares whether rendering succeeded.
// Results arrive in no particular order; a sink that wants an order has
// to sort them itself.
// =============================================================================

mod comparison;
mod json;
mod terminal;

use std::cmp::Ordering;
use std::path::PathBuf;

use crate::checker::CheckResult;
use crate::error::CrawlError;

pub use comparison::{comparison_report_path, ComparisonReport};
pub use json::{default_report_path, JsonReport};
pub use terminal::TerminalReport;

/// Where a rendered report ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Written(PathBuf),
    Printed,
}

pub trait ReportSink {
    fn render(&self, results: &[CheckResult]) -> Result<ReportOutcome, CrawlError>;
}

// Problems first, then alphabetical by URL
fn report_order(a: &CheckResult, b: &CheckResult) -> Ordering {
    a.indexable()
        .cmp(&b.indexable())
        .then_with(|| a.url().cmp(b.url()))
}

/// Returns the results sorted for display, leaving the input untouched
fn sorted(results: &[CheckResult]) -> Vec<&CheckResult> {
    let mut sorted: Vec<&CheckResult> = results.iter().collect();
    sorted.sort_by(|a, b| report_order(a, b));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_indexable_first_then_url() {
        let results = vec![
            CheckResult::new("https://example.com/b", 200, true, vec![]),
            CheckResult::new("https://example.com/z", 404, false, vec!["Not found (404)".into()]),
            CheckResult::new("https://example.com/a", 200, true, vec![]),
            CheckResult::new("https://example.com/c", 0, false, vec!["Fetch failed: x".into()]),
        ];
        let order: Vec<&str> = sorted(&results).iter().map(|r| r.url()).collect();
        assert_eq!(
            order,
            vec![
                "https://example.com/c",
                "https://example.com/z",
                "https://example.com/a",
                "https://example.com/b",
            ]
        );
    }
}
