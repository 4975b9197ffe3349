// src/checker/html.rs
// =============================================================================
// This module reads indexability signals out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Signals we look for:
// - <meta name="robots" content="...noindex..."> (page opts out of search)
// - <link rel="canonical" href="..."> (page points search engines elsewhere)
// - Soft 404s: a 200 page whose body is nearly empty or says "not found"
//
// Everything here is synchronous on purpose: scraper's Html type is not
// Send, so it must be dropped before the checker awaits anything else.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

/// Pages with less visible body text than this are suspected soft 404s
const SOFT_404_MIN_TEXT_CHARS: usize = 200;

const SOFT_404_PHRASES: [&str; 2] = ["not found", "error 404"];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PageSignals {
    pub noindex: bool,
    /// Absolute canonical URL, if the page declares one
    pub canonical: Option<String>,
    pub soft_404: bool,
}

// Extracts the indexability signals from a page
//
// Parameters:
//   html: the page body
//   page_url: the URL of the page (for resolving a relative canonical)
pub fn extract_page_signals(html: &str, page_url: &str) -> PageSignals {
    let document = Html::parse_document(html);

    // Constant selectors, known to be valid
    let robots_selector = Selector::parse(r#"meta[name="robots"]"#).unwrap();
    let canonical_selector = Selector::parse(r#"link[rel="canonical"]"#).unwrap();
    let body_selector = Selector::parse("body").unwrap();

    let noindex = document
        .select(&robots_selector)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(|content| content.to_lowercase().contains("noindex"))
        .unwrap_or(false);

    let canonical = document
        .select(&canonical_selector)
        .next()
        .and_then(|link| link.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .and_then(|href| resolve_url(page_url, href));

    let body_text: String = document
        .select(&body_selector)
        .next()
        .map(|body| body.text().collect())
        .unwrap_or_default();

    PageSignals {
        noindex,
        canonical,
        soft_404: looks_like_soft_404(body_text.trim()),
    }
}

fn looks_like_soft_404(body_text: &str) -> bool {
    if body_text.chars().count() < SOFT_404_MIN_TEXT_CHARS {
        return true;
    }
    let lowered = body_text.to_lowercase();
    SOFT_404_PHRASES.iter().any(|phrase| lowered.contains(phrase))
}

// Resolves a possibly-relative href against the page URL
//
// Examples:
//   page = "https://example.com/page"
//   href = "/docs" -> Some("https://example.com/docs")
//   href = "https://other.com/x" -> Some("https://other.com/x")
fn resolve_url(page_url: &str, href: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => Url::parse(page_url)
            .ok()?
            .join(href)
            .ok()
            .map(|url| url.to_string()),
    }
}
