// src/report/terminal.rs
// =============================================================================
// Prints the results to the terminal, either as a table or as JSON.
//
// The table shows non-indexable pages first, then a short summary:
//
//   URL                          STATUS  INDEXABLE  ISSUES
//   https://example.com/gone     404     ❌ NO      Not found (404)
//   ...
//   📊 Summary:
//      ✅ Indexable: 41
//      ❌ Not indexable: 1
//      📋 Total: 42
// =============================================================================

use std::io::{self, Write};

use super::{sorted, ReportOutcome, ReportSink};
use crate::checker::CheckResult;
use crate::error::CrawlError;

const URL_WIDTH: usize = 60;

#[derive(Debug, Clone, Default)]
pub struct TerminalReport {
    json: bool,
}

impl TerminalReport {
    /// `json = true` prints the results as JSON instead of a table
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn render_to<W: Write>(&self, out: &mut W, results: &[CheckResult]) -> Result<(), CrawlError> {
        if self.json {
            serde_json::to_writer_pretty(&mut *out, &sorted(results))?;
            writeln!(out)?;
        } else {
            write_table(out, results)?;
        }
        Ok(())
    }
}

impl ReportSink for TerminalReport {
    fn render(&self, results: &[CheckResult]) -> Result<ReportOutcome, CrawlError> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.render_to(&mut out, results)?;
        Ok(ReportOutcome::Printed)
    }
}

fn write_table<W: Write>(out: &mut W, results: &[CheckResult]) -> io::Result<()> {
    writeln!(out, "{:<60} {:<7} {:<10} {}", "URL", "STATUS", "INDEXABLE", "ISSUES")?;
    writeln!(out, "{}", "=".repeat(110))?;

    for result in sorted(results) {
        writeln!(
            out,
            "{:<60} {:<7} {:<10} {}",
            truncate_url(result.url()),
            format_status(result.status_code()),
            if result.indexable() { "✅ YES" } else { "❌ NO" },
            result.issues().join("; ")
        )?;
    }

    let indexable = results.iter().filter(|r| r.indexable()).count();

    writeln!(out)?;
    writeln!(out, "📊 Summary:")?;
    writeln!(out, "   ✅ Indexable: {}", indexable)?;
    writeln!(out, "   ❌ Not indexable: {}", results.len() - indexable)?;
    writeln!(out, "   📋 Total: {}", results.len())?;
    Ok(())
}

// Truncate URL if too long for display
fn truncate_url(url: &str) -> String {
    if url.chars().count() > URL_WIDTH - 3 {
        let head: String = url.chars().take(URL_WIDTH - 3).collect();
        format!("{}...", head)
    } else {
        url.to_string()
    }
}

fn format_status(code: u16) -> String {
    if code == 0 {
        "ERROR".to_string()
    } else {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<CheckResult> {
        vec![
            CheckResult::new("https://example.com/ok", 200, true, vec![]),
            CheckResult::new(
                "https://example.com/old",
                301,
                false,
                vec!["Redirect -> /new".to_string()],
            ),
            CheckResult::failed("https://example.com/down", "Fetch failed: Connection failed"),
        ]
    }

    #[test]
    fn test_table_lists_problems_and_summary() {
        let mut out = Vec::new();
        TerminalReport::new(false).render_to(&mut out, &results()).unwrap();
        let text = String::from_utf8(out).unwrap();

        let down = text.find("https://example.com/down").unwrap();
        let ok = text.find("https://example.com/ok").unwrap();
        assert!(down < ok);
        assert!(text.contains("Redirect -> /new"));
        assert!(text.contains("ERROR"));
        assert!(text.contains("✅ Indexable: 1"));
        assert!(text.contains("❌ Not indexable: 2"));
        assert!(text.contains("📋 Total: 3"));
    }

    #[test]
    fn test_json_output_is_parseable() {
        let mut out = Vec::new();
        TerminalReport::new(true).render_to(&mut out, &results()).unwrap();
        let parsed: Vec<CheckResult> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn test_truncate_long_url() {
        let long = format!("https://example.com/{}", "a".repeat(100));
        let shown = truncate_url(&long);
        assert_eq!(shown.chars().count(), URL_WIDTH);
        assert!(shown.ends_with("..."));
        assert_eq!(truncate_url("https://example.com/"), "https://example.com/");
    }
}
