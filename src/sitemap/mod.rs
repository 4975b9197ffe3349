// src/sitemap/mod.rs
// =============================================================================
// This module discovers the URLs a site wants search engines to crawl.
//
// Features:
// - Reads flat sitemaps (<urlset>) and sitemap indexes (<sitemapindex>)
// - Resolves one level of index nesting
// - Tolerates broken child sitemaps (logged, skipped)
// - Optional cap on the number of URLs for quick test runs
// - Local vs. production sitemap comparison (--compare-prod)
// =============================================================================

mod compare;
mod parse;
mod resolve;

pub use compare::{compare_sitemaps, ComparisonTargets, SitemapComparison};
pub use resolve::{apply_cap, resolve_sitemap};
