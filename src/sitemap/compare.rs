// src/sitemap/compare.rs
// =============================================================================
// Compares a local build's sitemap with the production one.
//
// Given the sitemap being crawled, we derive both the production sitemap
// URL (same path on the production origin) and the local one, resolve
// each into its page list, and report:
//   - missing in local: production pages the local build doesn't list
//   - extra in local: local pages production doesn't list
//
// Local URLs are moved onto the production origin before matching, so
// http://localhost:4321/a and https://hexmos.com/a count as the same page.
// A side that can't be loaded is treated as empty; the comparison never
// stops the crawl.
// =============================================================================

use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use super::resolve::resolve_sitemap;
use crate::checker::HttpClient;
use crate::normalize::{origin_of, Normalizer};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SitemapComparison {
    pub missing_in_local: Vec<String>,
    pub extra_in_local: Vec<String>,
    pub prod_total: usize,
    pub local_total: usize,
}

impl SitemapComparison {
    pub fn is_clean(&self) -> bool {
        self.missing_in_local.is_empty() && self.extra_in_local.is_empty()
    }
}

/// The production and local sitemap URLs for the sitemap given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTargets {
    pub prod: String,
    pub local: String,
}

impl ComparisonTargets {
    // If the given sitemap is the production one, the local twin lives at
    // the same path on the local origin; otherwise the given sitemap is the
    // local one.
    pub fn derive(sitemap_url: &str, prod_origin: &str, local_origin: &str) -> Self {
        let prod_origin = prod_origin.trim_end_matches('/');
        let to_prod = Normalizer::rebase(prod_origin);
        let local = if origin_of(sitemap_url).as_deref() == Some(prod_origin) {
            Normalizer::rebase(local_origin).normalize(sitemap_url)
        } else {
            sitemap_url.to_string()
        };

        Self {
            prod: to_prod.normalize(sitemap_url),
            local,
        }
    }
}

// Resolves both sitemaps and compares their page lists
pub async fn compare_sitemaps(
    client: &HttpClient,
    targets: &ComparisonTargets,
    prod_origin: &str,
) -> SitemapComparison {
    info!(url = %targets.prod, "fetching production sitemap for comparison");
    let prod_urls = load_side(client, &targets.prod).await;
    info!(url = %targets.local, "fetching local sitemap for comparison");
    let local_urls = load_side(client, &targets.local).await;

    let comparison = compare_urls(prod_urls, local_urls, &Normalizer::rebase(prod_origin));
    info!(
        missing = comparison.missing_in_local.len(),
        extra = comparison.extra_in_local.len(),
        "sitemap comparison done"
    );
    comparison
}

async fn load_side(client: &HttpClient, sitemap_url: &str) -> Vec<String> {
    // Children are read from the same server as the index
    let normalizer = match origin_of(sitemap_url) {
        Some(origin) => Normalizer::rebase(origin),
        None => Normalizer::identity(),
    };
    match resolve_sitemap(client, sitemap_url, &normalizer, 0).await {
        Ok(urls) => urls,
        Err(e) => {
            warn!(url = sitemap_url, error = %e, "sitemap for comparison could not be loaded");
            Vec::new()
        }
    }
}

// Set difference in both directions, each side sorted
//
// `to_prod` maps a local URL onto its production equivalent. Extra local
// pages are reported in their local form.
pub fn compare_urls(
    mut prod_urls: Vec<String>,
    mut local_urls: Vec<String>,
    to_prod: &Normalizer,
) -> SitemapComparison {
    prod_urls.sort();
    local_urls.sort();

    let prod_set: HashSet<&str> = prod_urls.iter().map(String::as_str).collect();
    let local_as_prod: HashSet<String> = local_urls.iter().map(|u| to_prod.normalize(u)).collect();

    let extra_in_local = local_urls
        .iter()
        .filter(|u| !prod_set.contains(to_prod.normalize(u).as_str()))
        .cloned()
        .collect();
    let missing_in_local = prod_urls
        .iter()
        .filter(|u| !local_as_prod.contains(u.as_str()))
        .cloned()
        .collect();

    SitemapComparison {
        missing_in_local,
        extra_in_local,
        prod_total: prod_urls.len(),
        local_total: local_urls.len(),
    }
}
