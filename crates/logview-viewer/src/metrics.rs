/*
[INPUT]:  Flushed batch sizes and terminal transitions from the feed driver
[OUTPUT]: Snapshot-friendly feed throughput metrics for UI display
[POS]:    Shared runtime metrics between the feed driver and UI
[UPDATE]: When adding/removing feed-level runtime signals
*/

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FeedMetricsSnapshot {
    pub records: u64,
    pub batches: u64,
    pub largest_batch: usize,
    pub elapsed: Duration,
    pub records_per_sec: f64,
    pub last_batch_at: Option<Instant>,
}

#[derive(Debug)]
pub struct FeedMetrics {
    started_at: Instant,
    records: u64,
    batches: u64,
    largest_batch: usize,
    last_batch_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl Default for FeedMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            records: 0,
            batches: 0,
            largest_batch: 0,
            last_batch_at: None,
            finished_at: None,
        }
    }

    pub fn snapshot(&self) -> FeedMetricsSnapshot {
        let elapsed = self
            .finished_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at);
        let secs = elapsed.as_secs_f64();
        FeedMetricsSnapshot {
            records: self.records,
            batches: self.batches,
            largest_batch: self.largest_batch,
            elapsed,
            records_per_sec: if secs > 0.0 {
                self.records as f64 / secs
            } else {
                0.0
            },
            last_batch_at: self.last_batch_at,
        }
    }

    pub fn record_batch(&mut self, size: usize) {
        self.records += size as u64;
        self.batches += 1;
        self.largest_batch = self.largest_batch.max(size);
        self.last_batch_at = Some(Instant::now());
    }

    /// Freeze the elapsed clock at the terminal transition.
    pub fn record_finished(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Instant::now());
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}
