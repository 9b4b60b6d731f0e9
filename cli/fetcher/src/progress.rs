//! Progress bar for bg-fetch.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use bg_fetcher::Progress;
use tokio::task::JoinHandle;

const BAR_WIDTH: usize = 40;
const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// Text progress bar redrawn on stderr by a background task.
pub struct ProgressBar {
    /// Whether the bar is drawn at all
    enabled: bool,
    /// Shared state for progress tracking
    state: Arc<ProgressState>,
    /// Handle to the background redraw task
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// Shared state for progress tracking.
struct ProgressState {
    total: AtomicUsize,
    done: AtomicUsize,
    stop: AtomicBool,
    start_time: Instant,
}

impl ProgressBar {
    /// Create a new progress bar.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: Arc::new(ProgressState {
                total: AtomicUsize::new(0),
                done: AtomicUsize::new(0),
                stop: AtomicBool::new(false),
                start_time: Instant::now(),
            }),
            handle: Mutex::new(None),
        }
    }

    /// Number of entries processed so far.
    #[cfg(test)]
    pub fn done(&self) -> usize {
        self.state.done.load(Ordering::Relaxed)
    }
}

impl Progress for ProgressBar {
    fn start(&self, total: usize) {
        self.state.total.store(total, Ordering::Relaxed);
        if !self.enabled {
            return;
        }

        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(REDRAW_INTERVAL);

            loop {
                interval_timer.tick().await;

                if state.stop.load(Ordering::Relaxed) {
                    break;
                }

                let line = render(
                    state.done.load(Ordering::Relaxed),
                    state.total.load(Ordering::Relaxed),
                    state.start_time.elapsed(),
                );
                let _ = write!(io::stderr(), "\r{line}");
            }
        });

        if let Ok(mut slot) = self.handle.lock() {
            *slot = Some(handle);
        }
    }

    fn increment(&self) {
        self.state.done.fetch_add(1, Ordering::Relaxed);
    }

    fn stop(&self) {
        self.state.stop.store(true, Ordering::Relaxed);
        if !self.enabled {
            return;
        }

        if let Some(handle) = self.handle.lock().ok().and_then(|mut slot| slot.take()) {
            handle.abort();
        }

        let line = render(
            self.state.done.load(Ordering::Relaxed),
            self.state.total.load(Ordering::Relaxed),
            self.state.start_time.elapsed(),
        );
        let _ = writeln!(io::stderr(), "\r{line}");
    }
}

/// Render one line of the bar, e.g. `████░░░░ 50% | 2/4 | 1.3s`.
fn render(done: usize, total: usize, elapsed: Duration) -> String {
    let ratio = if total == 0 {
        1.0
    } else {
        (done.min(total) as f64) / (total as f64)
    };
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;

    format!(
        "{}{} {:>3}% | {}/{} | {:.1}s",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        (ratio * 100.0).round() as usize,
        done,
        total,
        elapsed.as_secs_f64()
    )
}
