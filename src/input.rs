// src/input.rs
// =============================================================================
// Loads the URLs to check from a JSON file instead of a sitemap.
//
// The file must hold a JSON array of strings:
//
//   ["https://example.com/a", "https://example.com/b"]
//
// Handy for re-checking just the failures of a previous run.
// =============================================================================

use std::path::Path;

use crate::error::CrawlError;
use crate::normalize::Normalizer;

pub fn load_urls_from_json(path: &Path, normalizer: &Normalizer) -> Result<Vec<String>, CrawlError> {
    let invalid = |reason: String| CrawlError::InvalidInput {
        path: path.display().to_string(),
        reason,
    };

    let data = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let urls: Vec<String> = serde_json::from_str(&data).map_err(|e| invalid(e.to_string()))?;

    Ok(urls.iter().map(|u| normalizer.normalize(u)).collect())
}
