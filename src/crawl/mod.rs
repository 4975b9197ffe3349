// src/crawl/mod.rs
// =============================================================================
// This module runs the checker across every discovered URL.
//
// Features:
// - Fixed-size worker pool (default 200 workers)
// - Shared atomic completed counter
// - Progress line on stderr while the pool runs
// - Exactly one result per URL, even when a check fails or panics
//
// A CrawlRun lives for one invocation: it is built from the URL list,
// executed once, and the results are handed to the report sinks.
// =============================================================================

mod pool;
mod progress;

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::checker::{CheckResult, Checker};

use pool::run_pool;
use progress::spawn_progress;

pub use progress::DEFAULT_PROGRESS_INTERVAL;

/// Default number of concurrent workers
pub const DEFAULT_CONCURRENCY: usize = 200;

#[derive(Debug)]
pub struct CrawlRun {
    targets: Vec<String>,
    total: usize,
    concurrency: usize,
    completed: Arc<AtomicUsize>,
}

impl CrawlRun {
    pub fn new(targets: Vec<String>, concurrency: usize) -> Self {
        Self {
            total: targets.len(),
            targets,
            concurrency: concurrency.max(1),
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of jobs finished so far
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    // Checks every target and returns one result per target
    //
    // Pass a progress interval to print a progress line on stderr while running.
    pub async fn execute(
        &mut self,
        checker: Arc<dyn Checker>,
        progress: Option<Duration>,
    ) -> Vec<CheckResult> {
        let (results, _) = self
            .execute_with_progress(checker, progress.map(|interval| (interval, std::io::stderr())))
            .await;
        results
    }

    // Same as execute, with the progress line going to `out`
    //
    // Returns the writer once the tracker has printed its final line.
    async fn execute_with_progress<W>(
        &mut self,
        checker: Arc<dyn Checker>,
        progress: Option<(Duration, W)>,
    ) -> (Vec<CheckResult>, Option<W>)
    where
        W: Write + Send + 'static,
    {
        let total = self.total;
        info!(total, concurrency = self.concurrency, "starting crawl");

        let tracker = progress
            .map(|(interval, out)| spawn_progress(out, Arc::clone(&self.completed), total, interval));

        let jobs = std::mem::take(&mut self.targets);
        let results = run_pool(jobs, self.concurrency, checker, Arc::clone(&self.completed)).await;

        // The counter is final now, so the tracker ends its line within one interval
        let out = match tracker {
            Some(tracker) => match tracker.await {
                Ok(out) => Some(out),
                Err(e) => {
                    warn!(error = %e, "progress tracker ended abnormally");
                    None
                }
            },
            None => None,
        };

        info!(processed = results.len(), "crawl finished");
        (results, out)
    }
}
