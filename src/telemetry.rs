// src/telemetry.rs
// =============================================================================
// Logging setup.
//
// Diagnostics (skipped child sitemaps, worker problems, run summary) go
// through `tracing` to stderr. The report itself is printed to stdout, so
// `--json` output can still be piped into jq.
//
// With --log-file the same events are also appended to that file (without
// terminal colors), so a long crawl leaves a record behind.
//
// The level can be overridden with RUST_LOG, e.g.
//   RUST_LOG=sitemap_guardian=debug sitemap-guardian --sitemap ...
// =============================================================================

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Our own events at info, everything else (hyper, reqwest) only when it warns
pub const DEFAULT_LOG_FILTER: &str = "warn,sitemap_guardian=info";

pub fn init_telemetry(log_file: Option<&Path>) -> io::Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}
