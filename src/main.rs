// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap, then set up logging
// 2. Optionally compare the local sitemap with production (--compare-prod)
// 3. Collect the URLs to check (from a sitemap or a JSON file)
// 4. Check every URL with a pool of concurrent workers
// 5. Write the JSON report and print the results
// 6. Exit with proper code (0 = all indexable, 1 = problems found, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - Trait objects: The checker and report sinks are picked at runtime
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - per-URL checks and the shared HTTP client
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - worker pool and progress tracking
mod error; // src/error.rs - fatal error types
mod input; // src/input.rs - JSON URL list input
mod normalize; // src/normalize.rs - prod/local URL rewriting
mod report; // src/report/ - JSON file and terminal output
mod sitemap; // src/sitemap/ - sitemap and sitemap index resolution
mod telemetry; // src/telemetry.rs - logging setup

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use checker::{Checker, HeadChecker, HttpClient, PageChecker};
use cli::{Cli, CrawlConfig, Source};
use crawl::CrawlRun;
use report::{comparison_report_path, ComparisonReport, JsonReport, ReportOutcome, ReportSink, TerminalReport};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = telemetry::init_telemetry(cli.log_file.as_deref()) {
        eprintln!("Error: cannot open log file: {}", e);
        std::process::exit(2);
    }

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // If the run could not even start, print why and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = every URL is indexable
//   Ok(1) = at least one URL is not indexable
//   Err = fatal error (no report produced)
async fn run(cli: Cli) -> Result<i32> {
    let config = cli.into_config()?;
    let client = HttpClient::new(&config.client).context("failed to build HTTP client")?;

    if let Some(comparison) = &config.comparison {
        eprintln!("🔀 Comparing {} with {}", comparison.targets.local, comparison.targets.prod);
        let result =
            sitemap::compare_sitemaps(&client, &comparison.targets, &comparison.prod_origin).await;
        let path = ComparisonReport::new(comparison_report_path(&config.output))
            .render(&result)
            .context("failed to write comparison report")?;
        info!(path = %path.display(), "comparison written");
    }

    let urls = load_targets(&config, &client).await?;

    let checker: Arc<dyn Checker> = if config.head_only {
        Arc::new(HeadChecker::new(client))
    } else {
        Arc::new(PageChecker::new(client, config.normalizer.clone()))
    };

    let mut run = CrawlRun::new(urls, config.concurrency);
    eprintln!("📄 Total URLs to check: {}", run.total());

    let results = run.execute(checker, config.progress).await;
    eprintln!("✅ Processed {}/{} URL(s)", run.completed(), run.total());

    let sinks: Vec<Box<dyn ReportSink>> = vec![
        Box::new(JsonReport::new(&config.output)),
        Box::new(TerminalReport::new(config.json)),
    ];
    for sink in &sinks {
        if let ReportOutcome::Written(path) = sink.render(&results).context("failed to write report")? {
            info!(path = %path.display(), "report written");
        }
    }

    let not_indexable = results.iter().filter(|r| !r.indexable()).count();
    if not_indexable > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Resolves the configured source into the list of URLs to check
//
// A sitemap that can't be loaded is fatal: there is nothing to crawl.
async fn load_targets(config: &CrawlConfig, client: &HttpClient) -> Result<Vec<String>> {
    match &config.source {
        Source::Sitemap(url) => {
            eprintln!("🔍 Loading sitemap: {}", url);
            let urls = sitemap::resolve_sitemap(client, url, &config.normalizer, config.max_pages)
                .await
                .context("cannot start crawl")?;
            Ok(urls)
        }
        Source::Input(path) => {
            eprintln!("🔍 Loading URLs from: {}", path.display());
            let mut urls = input::load_urls_from_json(path, &config.normalizer)?;
            if sitemap::apply_cap(&mut urls, config.max_pages) {
                info!(max_pages = config.max_pages, "limiting to first {} URLs", config.max_pages);
            }
            Ok(urls)
        }
    }
}
