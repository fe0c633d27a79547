//! Concurrent size resolution.
//!
//! Cache hits are assigned up front. Misses go into a shared queue drained
//! by a fixed number of workers; each worker sends `(index, url, result)` to
//! one channel and the merge loop here is the only code that touches the
//! variants, the cache and the counters.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use footprint_probe::{ProbeClient, ProbeResult};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cache::SizeCache;
use crate::config::DEFAULT_WORKERS;
use crate::model::VideoVariant;
use crate::report::progress::{FetchProgress, ProgressSink};

/// Anything that can determine the byte size behind a URL.
#[async_trait]
pub trait SizeProbe: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeResult<u64>;
}

#[async_trait]
impl SizeProbe for ProbeClient {
    async fn probe(&self, url: &str) -> ProbeResult<u64> {
        ProbeClient::probe(self, url).await
    }
}

/// Counters of one `resolve_sizes` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Sizes known after the run (cache hits included).
    pub successful: usize,
    /// Variants left without a size.
    pub failed: usize,
    pub cache_hits: usize,
    /// Probes dispatched to workers.
    pub probed: usize,
}

impl FetchStats {
    /// Share of variants with a known size, in percent.
    pub fn success_rate(&self) -> f64 {
        let total = self.successful + self.failed;
        if total == 0 {
            0.0
        } else {
            self.successful as f64 * 100.0 / total as f64
        }
    }
}

struct WorkResult {
    index: usize,
    url: String,
    result: ProbeResult<u64>,
}

pub struct Coordinator {
    probe: Arc<dyn SizeProbe>,
    workers: usize,
    deadline: Option<Duration>,
    progress: Option<ProgressSink>,
}

impl Coordinator {
    pub fn new(probe: Arc<dyn SizeProbe>) -> Self {
        Self {
            probe,
            workers: DEFAULT_WORKERS,
            deadline: None,
            progress: None,
        }
    }

    /// Worker pool width (at least one).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Stop waiting for probes after `deadline`; unfinished variants count
    /// as failed.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_progress(mut self, progress: Option<ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Fill in `size_bytes` for every variant it can, recording new sizes in
    /// `cache`. Failed probes leave the size absent and are not cached.
    pub async fn resolve_sizes(
        &self,
        variants: &mut [VideoVariant],
        cache: &mut SizeCache,
    ) -> FetchStats {
        let mut stats = FetchStats::default();
        let mut misses = VecDeque::new();

        for (index, variant) in variants.iter_mut().enumerate() {
            match cache.get(&variant.url) {
                Some(size) => {
                    variant.size_bytes = Some(size);
                    stats.successful += 1;
                    stats.cache_hits += 1;
                }
                None => misses.push_back((index, variant.url.clone())),
            }
        }

        let total = misses.len();
        if total == 0 {
            debug!(cache_hits = stats.cache_hits, "all sizes cached");
            return stats;
        }

        let width = self.workers.min(total);
        info!(uncached = total, workers = width, "fetching sizes");

        let queue = Arc::new(Mutex::new(misses));
        let (tx, mut rx) = mpsc::channel::<WorkResult>(width * 2);
        let mut pool = JoinSet::new();

        for _ in 0..width {
            let queue = Arc::clone(&queue);
            let probe = Arc::clone(&self.probe);
            let tx = tx.clone();
            pool.spawn(async move {
                loop {
                    let next = queue.lock().unwrap_or_else(|p| p.into_inner()).pop_front();
                    let Some((index, url)) = next else {
                        break;
                    };
                    let result = probe.probe(&url).await;
                    if tx.send(WorkResult { index, url, result }).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let deadline = self.deadline.map(|d| tokio::time::Instant::now() + d);
        let mut done = 0;

        loop {
            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, rx.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        warn!(
                            pending = total - done,
                            "fetch deadline reached, abandoning remaining probes"
                        );
                        pool.abort_all();
                        break;
                    }
                },
                None => rx.recv().await,
            };
            let Some(item) = next else {
                break;
            };

            done += 1;
            stats.probed += 1;
            match item.result {
                Ok(size) => {
                    variants[item.index].size_bytes = Some(size);
                    cache.put(&item.url, size);
                    stats.successful += 1;
                }
                Err(e) => {
                    debug!(url = %item.url, error = %e, "size unknown");
                    stats.failed += 1;
                }
            }

            if let Some(sink) = &self.progress {
                sink(FetchProgress {
                    done,
                    total,
                    successful: stats.successful,
                    failed: stats.failed,
                });
            }
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                if !e.is_cancelled() {
                    warn!(error = %e, "probe worker failed");
                }
            }
        }

        // Items lost to a panicked worker or the deadline.
        if done < total {
            stats.failed += total - done;
        }

        stats
    }
}
