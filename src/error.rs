// src/error.rs
// =============================================================================
// Typed errors for the crawl engine.
//
// Only run-aborting failures live here. A child sitemap that cannot be
// fetched is logged and skipped, and a page that cannot be fetched becomes
// a failing CheckResult, so neither ever reaches this type.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The root sitemap could not be downloaded (network error or non-2xx)
    #[error("failed to load sitemap {url}: {reason}")]
    RootFetch { url: String, reason: String },

    /// The root document is neither a <urlset> nor a <sitemapindex>
    #[error("{url} is not a sitemap or sitemap index")]
    NotASitemap { url: String },

    /// The --input file could not be read or is not a JSON array of strings
    #[error("invalid input file {path}: {reason}")]
    InvalidInput { path: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
