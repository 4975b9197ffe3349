// src/sitemap/resolve.rs
// =============================================================================
// Turns a sitemap URL into the flat list of page URLs to check.
//
// How it works:
// 1. Fetch the root document (failure here aborts the whole run)
// 2. If it lists <url> entries, those are the pages
// 3. Otherwise, if it lists <sitemap> entries, fetch each child sitemap and
//    collect its <url> entries. A broken child is logged and skipped.
// 4. Normalize every URL, then apply the --max-pages cap
//
// Child sitemap locations go through the normalizer too, so in local mode
// an index that still lists production children is read from the local
// server. A root that turns malformed partway through keeps the entries
// read before the bad spot; one that is malformed before any entry is fatal.
//
// Only one level of nesting is resolved: a child that is itself an index
// contributes nothing. URLs are not deduplicated; if two child sitemaps
// list the same page it is checked twice.
// =============================================================================

use tracing::{info, warn};

use super::parse::{parse_sitemap, DocumentKind};
use crate::checker::HttpClient;
use crate::error::CrawlError;
use crate::normalize::Normalizer;

// Resolves a sitemap (or sitemap index) into normalized page URLs
//
// Parameters:
//   client: shared HTTP client
//   sitemap_url: root sitemap URL (used as given, not normalized)
//   normalizer: rewrite applied to every discovered page URL
//   max_urls: cap on the number of URLs returned (0 = unlimited)
pub async fn resolve_sitemap(
    client: &HttpClient,
    sitemap_url: &str,
    normalizer: &Normalizer,
    max_urls: usize,
) -> Result<Vec<String>, CrawlError> {
    let xml = client
        .fetch_document(sitemap_url)
        .await
        .map_err(|e| CrawlError::RootFetch {
            url: sitemap_url.to_string(),
            reason: e.to_string(),
        })?;

    let root = match parse_sitemap(&xml) {
        Ok(doc) => doc,
        Err(e) if !e.partial.urls.is_empty() || !e.partial.sitemaps.is_empty() => {
            warn!(
                url = sitemap_url,
                error = %e.source,
                kept = e.partial.urls.len() + e.partial.sitemaps.len(),
                "root sitemap is malformed, keeping the entries before the error"
            );
            e.partial
        }
        Err(e) => {
            warn!(url = sitemap_url, error = %e.source, "root sitemap is not valid XML");
            return Err(CrawlError::NotASitemap {
                url: sitemap_url.to_string(),
            });
        }
    };

    let mut urls = Vec::new();

    if !root.urls.is_empty() {
        urls.extend(root.urls.iter().map(|u| normalizer.normalize(u)));
    } else if !root.sitemaps.is_empty() {
        info!(
            url = sitemap_url,
            children = root.sitemaps.len(),
            "resolving sitemap index"
        );
        for child in &root.sitemaps {
            let child_urls = fetch_child(client, &normalizer.normalize(child)).await;
            urls.extend(child_urls.iter().map(|u| normalizer.normalize(u)));
        }
    } else if root.kind == DocumentKind::Unknown {
        return Err(CrawlError::NotASitemap {
            url: sitemap_url.to_string(),
        });
    }

    if apply_cap(&mut urls, max_urls) {
        info!(max_urls, "limiting to first {} URLs", max_urls);
    }

    Ok(urls)
}

// Fetches one child sitemap of an index and returns its page URLs
//
// Never fails: a child that can't be fetched or parsed contributes no URLs.
async fn fetch_child(client: &HttpClient, url: &str) -> Vec<String> {
    let xml = match client.fetch_document(url).await {
        Ok(xml) => xml,
        Err(e) => {
            warn!(url, error = %e, "skipping child sitemap that failed to load");
            return Vec::new();
        }
    };

    match parse_sitemap(&xml) {
        Ok(doc) => {
            if doc.urls.is_empty() && !doc.sitemaps.is_empty() {
                warn!(url, "nested sitemap index is not resolved");
            }
            doc.urls
        }
        Err(e) => {
            warn!(url, error = %e.source, "skipping child sitemap that failed to parse");
            Vec::new()
        }
    }
}

/// Truncates `urls` to `max_urls` entries (0 = no cap)
///
/// Returns true if anything was dropped.
pub fn apply_cap(urls: &mut Vec<String>, max_urls: usize) -> bool {
    if max_urls > 0 && urls.len() > max_urls {
        urls.truncate(max_urls);
        true
    } else {
        false
    }
}
