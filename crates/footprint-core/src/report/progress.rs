//! Fetch progress. The coordinator emits one event per completed probe, in
//! completion order; the console layer consumes them via a sink.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One progress update with running tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchProgress {
    pub done: usize,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Sink for progress events. Called from the merge point only, never from
/// inside a probe, so a slow sink cannot stall in-flight requests.
pub type ProgressSink = Arc<dyn Fn(FetchProgress) + Send + Sync>;

/// Format a single progress line. Deterministic, unit-testable.
#[must_use]
pub fn format_progress_line(ev: &FetchProgress) -> String {
    let pct = if ev.total == 0 {
        100.0
    } else {
        ev.done as f64 * 100.0 / ev.total as f64
    };
    format!(
        "Progress: {}/{} ({:.1}%) - Success: {}, Failed: {}",
        ev.done, ev.total, pct, ev.successful, ev.failed
    )
}

/// Minimum interval between progress updates to avoid log spam.
const PROGRESS_MIN_INTERVAL_MS: u64 = 200;

/// Returns a sink that prints throttled progress lines to stderr.
/// Always emits the first and the final event.
pub fn default_progress_sink() -> ProgressSink {
    let last_emit: Mutex<Option<Instant>> = Mutex::new(None);
    Arc::new(move |ev: FetchProgress| {
        let now = Instant::now();
        let should_emit = {
            let mut last = last_emit.lock().unwrap_or_else(|p| p.into_inner());
            let interval_ok = last
                .map(|t| {
                    now.saturating_duration_since(t)
                        >= Duration::from_millis(PROGRESS_MIN_INTERVAL_MS)
                })
                .unwrap_or(true);
            let ok = ev.done == ev.total || interval_ok;
            if ok {
                *last = Some(now);
            }
            ok
        };
        if should_emit {
            eprintln!("  {}", format_progress_line(&ev));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_progress_line() {
        let line = format_progress_line(&FetchProgress {
            done: 3,
            total: 8,
            successful: 2,
            failed: 1,
        });
        assert_eq!(line, "Progress: 3/8 (37.5%) - Success: 2, Failed: 1");
    }
}
