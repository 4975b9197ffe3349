// src/normalize.rs
// =============================================================================
// This module rewrites URLs before they are queued for checking.
//
// When auditing a local build of a site, the sitemap still lists production
// URLs (https://hexmos.com/...). The local mode swaps that origin for the
// local dev server (http://localhost:4321/...) so every request hits the
// local build instead.
//
// The rewrite is a pure function: no I/O, no shared state, and applying it
// twice gives the same result as applying it once.
//
// Rust concepts:
// - Arc<dyn Fn>: A shareable, thread-safe function value
// - Clone: Normalizer is cheap to clone (just a reference count bump)
// =============================================================================

use std::fmt;
use std::sync::Arc;
use url::{Position, Url};

/// Production origin used by the default local-mode rewrite
pub const DEFAULT_PROD_ORIGIN: &str = "https://hexmos.com";

/// Local dev server origin used by the default local-mode rewrite
pub const DEFAULT_LOCAL_ORIGIN: &str = "http://localhost:4321";

// Rewrites a URL according to a policy chosen at startup
//
// The policy is stored as a function so callers can plug in their own
// rewrite (tests do this) without the resolver knowing about it.
#[derive(Clone)]
pub struct Normalizer {
    policy: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl Normalizer {
    /// Leaves every URL untouched (prod mode)
    pub fn identity() -> Self {
        Self::custom(|url| url.to_string())
    }

    /// Replaces a leading `from` origin with `to` (local mode)
    ///
    /// Only a prefix match is rewritten, so a URL that merely mentions the
    /// production host in its query string is left alone.
    pub fn rewrite(from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        Self::custom(move |url| match url.strip_prefix(from.as_str()) {
            Some(rest) => format!("{}{}", to, rest),
            None => url.to_string(),
        })
    }

    /// Moves every http(s) URL onto `origin`, keeping path, query and fragment
    ///
    /// Used when auditing a local build whose sitemap index still lists
    /// production child sitemaps: the children are fetched from the same
    /// server as the index itself.
    pub fn rebase(origin: impl Into<String>) -> Self {
        let origin = origin.into();
        let origin = origin.trim_end_matches('/').to_string();
        Self::custom(move |url| rebase_onto(url, &origin))
    }

    /// Applies `self`, then `next`
    pub fn then(self, next: Normalizer) -> Self {
        Self::custom(move |url| next.normalize(&self.normalize(url)))
    }

    /// Wraps any caller-supplied rewrite function
    pub fn custom<F>(policy: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            policy: Arc::new(policy),
        }
    }

    pub fn normalize(&self, url: &str) -> String {
        (self.policy)(url)
    }
}

/// The `scheme://host[:port]` part of an http(s) URL
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(parsed.origin().ascii_serialization()),
        _ => None,
    }
}

fn rebase_onto(url: &str, origin: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
            format!("{}{}", origin, &parsed[Position::BeforePath..])
        }
        _ => url.to_string(),
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_leaves_url_alone() {
        let n = Normalizer::identity();
        assert_eq!(n.normalize("https://hexmos.com/a"), "https://hexmos.com/a");
    }

    #[test]
    fn test_rewrite_swaps_origin() {
        let n = Normalizer::rewrite(DEFAULT_PROD_ORIGIN, DEFAULT_LOCAL_ORIGIN);
        assert_eq!(
            n.normalize("https://hexmos.com/freedevtools/tldr/"),
            "http://localhost:4321/freedevtools/tldr/"
        );
    }

    #[test]
    fn test_rewrite_only_matches_prefix() {
        let n = Normalizer::rewrite(DEFAULT_PROD_ORIGIN, DEFAULT_LOCAL_ORIGIN);
        let url = "https://other.com/?ref=https://hexmos.com";
        assert_eq!(n.normalize(url), url);
    }

    #[test]
    fn test_rebase_keeps_path_and_query() {
        let n = Normalizer::rebase("http://127.0.0.1:8080/");
        assert_eq!(
            n.normalize("https://hexmos.com/freedevtools/sitemap.xml?page=2#top"),
            "http://127.0.0.1:8080/freedevtools/sitemap.xml?page=2#top"
        );
        assert_eq!(n.normalize("https://hexmos.com"), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_rebase_leaves_non_http_alone() {
        let n = Normalizer::rebase("http://localhost:4321");
        assert_eq!(n.normalize("not a url"), "not a url");
        assert_eq!(n.normalize("mailto:a@b.com"), "mailto:a@b.com");
    }

    #[test]
    fn test_then_applies_in_order() {
        let n = Normalizer::rebase(DEFAULT_PROD_ORIGIN)
            .then(Normalizer::rewrite(DEFAULT_PROD_ORIGIN, DEFAULT_LOCAL_ORIGIN));
        assert_eq!(
            n.normalize("https://cdn.hexmos.com/a"),
            "http://localhost:4321/a"
        );
    }

    #[test]
    fn test_origin_of() {
        assert_eq!(
            origin_of("http://localhost:4321/sitemap.xml").as_deref(),
            Some("http://localhost:4321")
        );
        assert_eq!(
            origin_of("https://hexmos.com/a/b").as_deref(),
            Some("https://hexmos.com")
        );
        assert_eq!(origin_of("sitemap.xml"), None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let policies = vec![
            Normalizer::identity(),
            Normalizer::rewrite(DEFAULT_PROD_ORIGIN, DEFAULT_LOCAL_ORIGIN),
            Normalizer::rebase("http://127.0.0.1"),
            Normalizer::rebase(DEFAULT_PROD_ORIGIN)
                .then(Normalizer::rewrite(DEFAULT_PROD_ORIGIN, DEFAULT_LOCAL_ORIGIN)),
        ];
        let urls = [
            "https://hexmos.com/",
            "https://hexmos.com/a/b?c=d",
            "http://localhost:4321/x",
            "https://example.com/p1",
            "",
        ];
        for n in &policies {
            for url in urls {
                let once = n.normalize(url);
                assert_eq!(n.normalize(&once), once, "not idempotent for {}", url);
            }
        }
    }
}
