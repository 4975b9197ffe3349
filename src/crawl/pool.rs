// src/crawl/pool.rs
// =============================================================================
// The worker pool that checks every URL.
//
// How it works:
// 1. Every job goes into a queue sized to the job count, then the queue is
//    closed. Workers exit once it is drained.
// 2. Exactly `concurrency` workers are spawned. Each one loops: take a job,
//    run the checker, send the result, bump the shared counter.
// 3. We wait for every worker to finish (join barrier), and only then
//    close the results channel and drain it.
//
// The results channel is also sized to the job count, so a worker never
// waits on the aggregator. Results come back in completion order, not
// submission order.
//
// Rust concepts:
// - Arc<Mutex<Receiver>>: tokio's mpsc receiver has a single owner, so
//   workers share it behind an async mutex
// - AtomicUsize: a counter many tasks can bump without a lock
// - catch_unwind: a panicking checker still yields a result for its job
// =============================================================================

use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error};

use crate::checker::{CheckResult, Checker};

type JobQueue = Arc<Mutex<mpsc::Receiver<String>>>;

// Runs `checker` over every job with a fixed number of workers
//
// Parameters:
//   jobs: the URLs to check, one result is produced per entry
//   concurrency: number of workers (values below 1 are treated as 1)
//   checker: shared checker, called once per job
//   completed: incremented once per finished job
//
// Returns: one CheckResult per job, in no particular order
pub async fn run_pool(
    jobs: Vec<String>,
    concurrency: usize,
    checker: Arc<dyn Checker>,
    completed: Arc<AtomicUsize>,
) -> Vec<CheckResult> {
    let total = jobs.len();
    let capacity = total.max(1);

    let (job_tx, job_rx) = mpsc::channel::<String>(capacity);
    for job in jobs {
        // The queue has room for every job and we still hold the receiver
        if let Err(e) = job_tx.send(job).await {
            error!(url = %e.0, "job queue closed before enqueueing finished");
        }
    }
    drop(job_tx);

    let queue: JobQueue = Arc::new(Mutex::new(job_rx));
    let (result_tx, result_rx) = mpsc::channel::<CheckResult>(capacity);

    let workers: Vec<_> = (0..concurrency.max(1))
        .map(|id| {
            tokio::spawn(worker_loop(
                id,
                Arc::clone(&queue),
                result_tx.clone(),
                Arc::clone(&checker),
                Arc::clone(&completed),
            ))
        })
        .collect();

    for joined in join_all(workers).await {
        if let Err(e) = joined {
            error!(error = %e, "worker task ended abnormally");
        }
    }
    drop(result_tx);

    collect_results(result_rx, total).await
}

async fn worker_loop(
    id: usize,
    queue: JobQueue,
    results: mpsc::Sender<CheckResult>,
    checker: Arc<dyn Checker>,
    completed: Arc<AtomicUsize>,
) {
    let mut handled = 0usize;

    loop {
        // Hold the lock only while taking a job, never while checking it
        let next = queue.lock().await.recv().await;
        let Some(url) = next else { break };

        let result = match AssertUnwindSafe(checker.check(&url)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                error!(worker = id, url = %url, "checker panicked");
                CheckResult::failed(url.as_str(), "Checker panicked")
            }
        };

        if results.send(result).await.is_err() {
            error!(worker = id, "results channel closed early");
            break;
        }
        completed.fetch_add(1, Ordering::SeqCst);
        handled += 1;
    }

    debug!(worker = id, handled, "worker finished");
}

// Drains the (closed) results channel into the final collection
//
// Called only after every worker has exited, so the channel already holds
// everything it will ever hold.
pub async fn collect_results(
    mut results: mpsc::Receiver<CheckResult>,
    expected: usize,
) -> Vec<CheckResult> {
    let mut all = Vec::with_capacity(expected);
    while let Some(result) = results.recv().await {
        all.push(result);
    }

    if all.len() != expected {
        error!(
            collected = all.len(),
            expected, "result count does not match job count"
        );
    }
    all
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why size both channels to the job count?
//    - The queue can be filled completely before any worker starts
//    - Workers can always send a result, even though nobody reads the
//      results channel until the very end
//    - A crawl knows its job count upfront, so the memory cost is bounded
//
// 2. Why is the job receiver behind a Mutex?
//    - mpsc = multi-producer, single-consumer
//    - Many workers want to consume, so they take turns holding it
//    - The lock is released before the (slow) check starts
//
// 3. What does join_all do?
//    - Waits for every JoinHandle to finish
//    - A JoinHandle returns Err if its task panicked or was cancelled
//
// 4. Why Ordering::SeqCst?
//    - The strictest memory ordering; simple to reason about
//    - The counter is touched once per job, so speed doesn't matter here
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::time::Duration;

    // Echoes the URL back and records how many checks overlap
    #[derive(Default)]
    struct RecordingChecker {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Duration,
    }

    impl RecordingChecker {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl Checker for RecordingChecker {
        async fn check(&self, url: &str) -> CheckResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            CheckResult::new(url, 200, true, vec![])
        }
    }

    fn jobs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://example.com/p{}", i)).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_job_yields_one_result() {
        for (n, concurrency) in [(1, 1), (10, 1), (10, 3), (10, 10), (57, 8), (5, 200)] {
            let completed = Arc::new(AtomicUsize::new(0));
            let checker = Arc::new(RecordingChecker::default());
            let results = run_pool(jobs(n), concurrency, checker, Arc::clone(&completed)).await;

            assert_eq!(results.len(), n);
            assert_eq!(completed.load(Ordering::SeqCst), n);
            let urls: HashSet<_> = results.iter().map(|r| r.url().to_string()).collect();
            let expected: HashSet<_> = jobs(n).into_iter().collect();
            assert_eq!(urls, expected);
        }
    }

    #[tokio::test]
    async fn test_empty_job_list() {
        let completed = Arc::new(AtomicUsize::new(0));
        let results = run_pool(
            Vec::new(),
            4,
            Arc::new(RecordingChecker::default()),
            Arc::clone(&completed),
        )
        .await;
        assert!(results.is_empty());
        assert_eq!(completed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_worker_never_overlaps() {
        let checker = Arc::new(RecordingChecker::with_delay(Duration::from_millis(20)));
        let completed = Arc::new(AtomicUsize::new(0));
        let results = run_pool(jobs(3), 1, checker.clone(), completed).await;

        assert_eq!(results.len(), 3);
        assert_eq!(checker.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let checker = Arc::new(RecordingChecker::with_delay(Duration::from_millis(20)));
        let completed = Arc::new(AtomicUsize::new(0));
        let results = run_pool(jobs(40), 5, checker.clone(), completed).await;

        assert_eq!(results.len(), 40);
        assert!(checker.max_in_flight.load(Ordering::SeqCst) <= 5);
    }

    // One URL hangs until it "times out"; the rest finish independently
    struct SlowHostChecker;

    #[async_trait]
    impl Checker for SlowHostChecker {
        async fn check(&self, url: &str) -> CheckResult {
            if url.ends_with("/slow") {
                tokio::time::sleep(Duration::from_millis(300)).await;
                return CheckResult::failed(url, "Fetch failed: Request timed out");
            }
            CheckResult::new(url, 200, true, vec![])
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_slow_job_does_not_block_others() {
        let mut urls = vec!["https://example.com/slow".to_string()];
        urls.extend(jobs(20));
        let completed = Arc::new(AtomicUsize::new(0));

        let results = run_pool(urls, 4, Arc::new(SlowHostChecker), Arc::clone(&completed)).await;

        assert_eq!(results.len(), 21);
        let slow = results
            .iter()
            .find(|r| r.url().ends_with("/slow"))
            .unwrap();
        assert!(!slow.indexable());
        assert!(!slow.issues().is_empty());
        // The slow result finishes last even though it was submitted first
        assert!(results.last().unwrap().url().ends_with("/slow"));
    }

    struct PanickingChecker;

    #[async_trait]
    impl Checker for PanickingChecker {
        async fn check(&self, url: &str) -> CheckResult {
            if url.ends_with("p1") {
                panic!("checker bug");
            }
            CheckResult::new(url, 200, true, vec![])
        }
    }

    #[tokio::test]
    async fn test_panicking_checker_still_yields_result() {
        let completed = Arc::new(AtomicUsize::new(0));
        let results = run_pool(jobs(3), 2, Arc::new(PanickingChecker), Arc::clone(&completed)).await;

        assert_eq!(results.len(), 3);
        assert_eq!(completed.load(Ordering::SeqCst), 3);
        let failed = results.iter().find(|r| r.url().ends_with("p1")).unwrap();
        assert_eq!(failed.status_code(), 0);
        assert_eq!(failed.issues(), ["Checker panicked"]);
    }
}
