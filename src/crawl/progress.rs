// src/crawl/progress.rs
// =============================================================================
// Prints a "Progress: 42/1000 URLs checked" line while the pool runs
// (to stderr in a real run, so stdout stays clean for --json).
//
// The tracker polls the shared completed counter on a fixed interval and
// rewrites the same terminal line (\r). Once every job is done it ends the
// line and stops. It runs as its own task; the crawl awaits it only after
// the pool is done, so the final line is printed before anything else.
// =============================================================================

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How often the progress line is refreshed by default
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Spawns the tracker; the handle yields the writer back once it is done
pub fn spawn_progress<W>(
    out: W,
    completed: Arc<AtomicUsize>,
    total: usize,
    interval: Duration,
) -> JoinHandle<W>
where
    W: Write + Send + 'static,
{
    tokio::spawn(track_progress(out, completed, total, interval))
}

// Polls `completed` until it reaches `total`, writing one status line
//
// Returns the writer so tests can inspect what was printed.
pub async fn track_progress<W: Write>(
    mut out: W,
    completed: Arc<AtomicUsize>,
    total: usize,
    interval: Duration,
) -> W {
    loop {
        let done = completed.load(Ordering::SeqCst);
        // Progress output is best effort; a closed stderr must not stop us
        let _ = write!(out, "\rProgress: {}/{} URLs checked", done, total);
        let _ = out.flush();

        if done >= total {
            let _ = writeln!(out);
            break;
        }
        tokio::time::sleep(interval).await;
    }
    out
}
