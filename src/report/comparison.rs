// src/report/comparison.rs
// =============================================================================
// Reports the result of comparing the local sitemap with production.
//
// The comparison is written next to the page report as
// <report>-comparison.json, and a short summary is printed to stderr:
//
//   🔀 Sitemap comparison (prod 120 URLs, local 118 URLs):
//      ➖ Missing in local: 3
//         https://hexmos.com/old-page
//      ➕ Extra in local: 1
//         http://localhost:4321/draft
// =============================================================================

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::CrawlError;
use crate::sitemap::SitemapComparison;

#[derive(Debug, Clone)]
pub struct ComparisonReport {
    path: PathBuf,
}

impl ComparisonReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    // Writes the JSON file and prints the summary to stderr
    pub fn render(&self, comparison: &SitemapComparison) -> Result<PathBuf, CrawlError> {
        let json = serde_json::to_string_pretty(comparison)?;
        std::fs::write(&self.path, json)?;

        let stderr = io::stderr();
        write_summary(&mut stderr.lock(), comparison)?;
        Ok(self.path.clone())
    }
}

fn write_summary<W: Write>(out: &mut W, comparison: &SitemapComparison) -> io::Result<()> {
    writeln!(
        out,
        "🔀 Sitemap comparison (prod {} URLs, local {} URLs):",
        comparison.prod_total, comparison.local_total
    )?;
    if comparison.is_clean() {
        writeln!(out, "   ✅ Local and production list the same pages")?;
        return Ok(());
    }

    writeln!(out, "   ➖ Missing in local: {}", comparison.missing_in_local.len())?;
    for url in &comparison.missing_in_local {
        writeln!(out, "      {}", url)?;
    }
    writeln!(out, "   ➕ Extra in local: {}", comparison.extra_in_local.len())?;
    for url in &comparison.extra_in_local {
        writeln!(out, "      {}", url)?;
    }
    Ok(())
}

/// `report.json` -> `report-comparison.json`, in the same directory
pub fn comparison_report_path(report_path: &Path) -> PathBuf {
    let stem = report_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sitemap_report".to_string());
    report_path.with_file_name(format!("{}-comparison.json", stem))
}
