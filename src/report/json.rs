// src/report/json.rs
// =============================================================================
// Writes the results to a JSON file.
//
// Each record looks like:
//   { "URL": "...", "Status": 200, "Indexable": true, "Issues": [] }
//
// Non-indexable pages come first so the interesting part of a large report
// is at the top.
// =============================================================================

use std::path::PathBuf;

use super::{sorted, ReportOutcome, ReportSink};
use crate::checker::CheckResult;
use crate::error::CrawlError;

#[derive(Debug, Clone)]
pub struct JsonReport {
    path: PathBuf,
}

impl JsonReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonReport {
    fn render(&self, results: &[CheckResult]) -> Result<ReportOutcome, CrawlError> {
        let json = serde_json::to_string_pretty(&sorted(results))?;
        std::fs::write(&self.path, json)?;
        Ok(ReportOutcome::Written(self.path.clone()))
    }
}

// Derives a report file name from the sitemap URL
//
// Example:
//   "https://hexmos.com/freedevtools/tldr/sitemap.xml"
//   -> "sitemap_report-hexmos.com-freedevtools-tldr-sitemap.json"
pub fn default_report_path(sitemap_url: &str) -> PathBuf {
    let without_scheme = sitemap_url
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let flattened: String = without_scheme
        .chars()
        .map(|c| match c {
            '/' => '-',
            ':' | '?' | '&' | '=' | '*' | '"' | '<' | '>' | '|' | '\\' => '_',
            c => c,
        })
        .collect();
    let stem = flattened
        .trim_end_matches('-')
        .trim_end_matches("-sitemap.xml");

    PathBuf::from(format!("sitemap_report-{}-sitemap.json", stem))
}
