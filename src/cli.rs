// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// The parsed `Cli` is then turned into a `CrawlConfig`, which is what the
// rest of the program actually uses. That's where defaults get resolved
// (e.g. the report file name) and where values are validated.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use anyhow::{anyhow, Result};
use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::checker::{ClientConfig, DEFAULT_USER_AGENT};
use crate::crawl::{DEFAULT_CONCURRENCY, DEFAULT_PROGRESS_INTERVAL};
use crate::normalize::{origin_of, Normalizer, DEFAULT_LOCAL_ORIGIN, DEFAULT_PROD_ORIGIN};
use crate::report::default_report_path;
use crate::sitemap::ComparisonTargets;

// This struct represents our entire CLI application
//
// Exactly one of --sitemap or --input must be given (the "source" group).
#[derive(Parser, Debug)]
#[command(
    name = "sitemap-guardian",
    version = "0.1.0",
    about = "Crawl a sitemap and check every listed page for indexability",
    long_about = "sitemap-guardian reads a sitemap (or sitemap index), fetches every listed page \
                  with a large pool of concurrent workers and reports redirects, 404s, server \
                  errors, noindex tags, broken canonicals and soft 404s."
)]
#[command(group(ArgGroup::new("source").required(true).args(["sitemap", "input"])))]
pub struct Cli {
    /// Sitemap or sitemap index URL (e.g., https://example.com/sitemap.xml)
    #[arg(long)]
    pub sitemap: Option<String>,

    /// JSON file holding an array of URLs to check instead of a sitemap
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY, value_parser = parse_concurrency)]
    pub concurrency: usize,

    /// prod checks URLs as listed, local rewrites them to the local server
    #[arg(long, value_enum, default_value_t = Mode::Prod)]
    pub mode: Mode,

    /// Origin replaced in local mode
    #[arg(long, default_value = DEFAULT_PROD_ORIGIN)]
    pub prod_origin: String,

    /// Origin substituted in local mode
    #[arg(long, default_value = DEFAULT_LOCAL_ORIGIN)]
    pub local_origin: String,

    /// Only check the first N URLs (0 = all of them)
    #[arg(long, default_value_t = 0)]
    pub max_pages: usize,

    /// Use HEAD requests only (status check without reading page bodies)
    #[arg(long)]
    pub head: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 1500, value_parser = parse_timeout_secs)]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Where to write the JSON report (default derived from the sitemap URL)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Print results as JSON on stdout instead of a table
    #[arg(long)]
    pub json: bool,

    /// Progress refresh interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL.as_millis() as u64)]
    pub progress_ms: u64,

    /// Don't print the progress line
    #[arg(long)]
    pub quiet: bool,

    /// Also compare the sitemap's page list between local and production
    #[arg(long, requires = "sitemap")]
    pub compare_prod: bool,

    /// Append log output to this file as well as stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Prod,
    Local,
}

/// Where the URLs to check come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Sitemap(String),
    Input(PathBuf),
}

// Everything the run needs, with defaults resolved
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub source: Source,
    pub concurrency: usize,
    pub normalizer: Normalizer,
    pub max_pages: usize,
    pub head_only: bool,
    pub client: ClientConfig,
    pub output: PathBuf,
    pub json: bool,
    pub progress: Option<Duration>,
    /// Set with --compare-prod
    pub comparison: Option<Comparison>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub targets: ComparisonTargets,
    pub prod_origin: String,
}

impl Cli {
    pub fn into_config(self) -> Result<CrawlConfig> {
        let (source, default_output) = match (self.sitemap, self.input) {
            (Some(url), _) => {
                let output = default_report_path(&url);
                (Source::Sitemap(url), output)
            }
            (None, Some(path)) => (Source::Input(path), PathBuf::from("sitemap_report.json")),
            (None, None) => return Err(anyhow!("either --sitemap or --input is required")),
        };

        let comparison = match (&source, self.compare_prod) {
            (Source::Sitemap(url), true) => Some(Comparison {
                targets: ComparisonTargets::derive(url, &self.prod_origin, &self.local_origin),
                prod_origin: self.prod_origin.clone(),
            }),
            _ => None,
        };

        let normalizer = match (self.mode, &source) {
            (Mode::Prod, _) => Normalizer::identity(),
            // Pages and child sitemaps are read from the server the sitemap came from
            (Mode::Local, Source::Sitemap(url)) => match origin_of(url) {
                Some(origin) => Normalizer::rebase(origin)
                    .then(Normalizer::rewrite(self.prod_origin, self.local_origin)),
                None => Normalizer::rewrite(self.prod_origin, self.local_origin),
            },
            (Mode::Local, Source::Input(_)) => Normalizer::rewrite(self.prod_origin, self.local_origin),
        };

        Ok(CrawlConfig {
            source,
            concurrency: self.concurrency.max(1),
            normalizer,
            max_pages: self.max_pages,
            head_only: self.head,
            client: ClientConfig {
                timeout: Duration::from_secs(self.timeout_secs),
                user_agent: self.user_agent,
                ..ClientConfig::default()
            },
            output: self.output.unwrap_or(default_output),
            json: self.json,
            progress: (!self.quiet).then(|| Duration::from_millis(self.progress_ms.max(1))),
            comparison,
        })
    }
}

// Worker count must be a positive integer
fn parse_concurrency(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

// A zero timeout would fail every request before it starts
fn parse_timeout_secs(value: &str) -> Result<u64, String> {
    match value.parse::<u64>() {
        Ok(0) => Err("timeout must be at least 1 second".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}
