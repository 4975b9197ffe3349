// src/checker/mod.rs
// =============================================================================
// This module contains all per-URL checking logic.
//
// Submodules:
// - http: The shared HTTP client (tuned for hundreds of concurrent workers)
// - html: Reads indexability signals out of a fetched HTML page
// - page: The two Checker implementations (full page check, HEAD only)
//
// The worker pool only knows about the `Checker` trait defined here. It
// treats every checker as infallible: whatever goes wrong while checking a
// URL must come back as a CheckResult, never as an error or a panic.
//
// Rust concepts:
// - Traits: A shared interface the pool can call without knowing the type
// - async-trait: Lets trait methods be async and still usable as dyn Trait
// - Serde renames: Keep the JSON field names stable for report consumers
// =============================================================================

mod html;
mod http;
mod page;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::{ClientConfig, HttpClient, DEFAULT_USER_AGENT};
pub use page::{HeadChecker, PageChecker};

/// Checks a single URL and classifies it
///
/// Implementations may share read-only configuration (such as the HTTP
/// client) but no mutable state across calls.
#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self, url: &str) -> CheckResult;
}

// The outcome of checking one URL
//
// Built once by a Checker and then only moved around, never modified.
// The serialized names (URL, Status, Indexable, Issues) are the ones the
// site's existing report filters look for, e.g. "Indexable == false".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(rename = "URL")]
    url: String,
    /// HTTP status code, or 0 when no response was received at all
    #[serde(rename = "Status")]
    status_code: u16,
    #[serde(rename = "Indexable")]
    indexable: bool,
    #[serde(rename = "Issues")]
    issues: Vec<String>,
}

impl CheckResult {
    pub fn new(
        url: impl Into<String>,
        status_code: u16,
        indexable: bool,
        issues: Vec<String>,
    ) -> Self {
        Self {
            url: url.into(),
            status_code,
            indexable,
            issues,
        }
    }

    /// A result for a URL that never produced an HTTP response
    pub fn failed(url: impl Into<String>, issue: impl Into<String>) -> Self {
        Self::new(url, 0, false, vec![issue.into()])
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn indexable(&self) -> bool {
        self.indexable
    }

    pub fn issues(&self) -> &[String] {
        &self.issues
    }
}
