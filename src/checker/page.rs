// src/checker/page.rs
// =============================================================================
// The two Checker implementations.
//
// PageChecker (default) does one GET per URL and classifies the page:
// - 301/302/307/308: redirect, not indexable
// - 404: not found, not indexable
// - 5xx: server error, not indexable
// - any other non-200: not indexable
// - 200 HTML page: look for noindex, validate the canonical link, and
//   flag soft 404s (only the first 100 KB of the body are read)
//
// HeadChecker (--head) only looks at the status code of a HEAD request.
// It is much faster for huge sitemaps when all you need is 200 vs 404.
//
// Neither checker ever returns an error: a failed fetch becomes a
// CheckResult with status 0 and an issue describing what went wrong.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;

use super::html::extract_page_signals;
use super::http::{describe_error, read_body_prefix, HttpClient};
use super::{CheckResult, Checker};
use crate::normalize::Normalizer;

// Collects issues while a URL is being classified
//
// Starts out indexable; any rejecting issue flips it for good.
struct Verdict {
    indexable: bool,
    issues: Vec<String>,
}

impl Verdict {
    fn new() -> Self {
        Self {
            indexable: true,
            issues: Vec::new(),
        }
    }

    /// Records an issue that makes the page non-indexable
    fn reject(&mut self, issue: impl Into<String>) {
        self.indexable = false;
        self.issues.push(issue.into());
    }

    /// Records an informational issue
    fn note(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    fn finish(self, url: &str, status: StatusCode) -> CheckResult {
        CheckResult::new(url, status.as_u16(), self.indexable, self.issues)
    }
}

// Applies the status code rules shared by both checkers
fn classify_status(status: StatusCode, headers: &HeaderMap, verdict: &mut Verdict) {
    match status.as_u16() {
        200 => {}
        301 | 302 | 307 | 308 => {
            let target = headers
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            verdict.reject(format!("Redirect -> {}", target));
        }
        404 => verdict.reject("Not found (404)"),
        code if code >= 500 => verdict.reject("Server error (5xx)"),
        code => verdict.reject(format!("HTTP {}", code)),
    }
}

/// Only the start of a page is inspected; the signals live in <head> anyway
pub const MAX_BODY_BYTES: usize = 100 * 1024;

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_lowercase().contains("text/html"))
        .unwrap_or(false)
}

fn fetch_failed(url: &str, error: &reqwest::Error) -> CheckResult {
    tracing::debug!(url, error = %error, "fetch failed");
    CheckResult::failed(url, format!("Fetch failed: {}", describe_error(error)))
}

#[derive(Debug, Clone)]
pub struct PageChecker {
    client: HttpClient,
    normalizer: Normalizer,
}

impl PageChecker {
    /// `normalizer` is applied to canonical links before they are compared
    /// and validated, so local runs don't validate against production.
    pub fn new(client: HttpClient, normalizer: Normalizer) -> Self {
        Self { client, normalizer }
    }
}

#[async_trait]
impl Checker for PageChecker {
    async fn check(&self, url: &str) -> CheckResult {
        let response = match self.client.get_page(url).await {
            Ok(response) => response,
            Err(e) => return fetch_failed(url, &e),
        };

        let status = response.status();
        let mut verdict = Verdict::new();
        classify_status(status, response.headers(), &mut verdict);

        if status != StatusCode::OK || !is_html(response.headers()) {
            return verdict.finish(url, status);
        }

        let body = match read_body_prefix(response, MAX_BODY_BYTES).await {
            Ok(body) => body,
            Err(e) => {
                verdict.reject(format!("Fetch failed: {}", describe_error(&e)));
                return verdict.finish(url, status);
            }
        };

        let signals = extract_page_signals(&body, url);

        if signals.noindex {
            verdict.reject("Noindex tag");
        }

        if let Some(canonical) = signals.canonical {
            let canonical = self.normalizer.normalize(&canonical);
            if canonical != url {
                if self.client.validate_canonical(&canonical).await {
                    verdict.note(format!("Canonical -> {}", canonical));
                } else {
                    verdict.reject(format!("Canonical -> {} (INVALID)", canonical));
                }
            }
        }

        if signals.soft_404 {
            verdict.reject("Soft 404 suspected");
        }

        verdict.finish(url, status)
    }
}

#[derive(Debug, Clone)]
pub struct HeadChecker {
    client: HttpClient,
}

impl HeadChecker {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Checker for HeadChecker {
    async fn check(&self, url: &str) -> CheckResult {
        match self.client.head_page(url).await {
            Ok(response) => {
                let mut verdict = Verdict::new();
                classify_status(response.status(), response.headers(), &mut verdict);
                verdict.finish(url, response.status())
            }
            Err(e) => fetch_failed(url, &e),
        }
    }
}
