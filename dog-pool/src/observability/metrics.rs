use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

const MAX_SAMPLES: usize = 1000;

/// Live counters for pool operations
pub struct LiveMetrics {
    jobs_submitted: AtomicU64,
    jobs_claimed: AtomicU64,
    jobs_completed: AtomicU64,
    jobs_panicked: AtomicU64,

    performance: Mutex<PerformanceMetrics>,
}

impl LiveMetrics {
    pub fn new() -> Self {
        Self {
            jobs_submitted: AtomicU64::new(0),
            jobs_claimed: AtomicU64::new(0),
            jobs_completed: AtomicU64::new(0),
            jobs_panicked: AtomicU64::new(0),
            performance: Mutex::new(PerformanceMetrics::new()),
        }
    }

    pub fn increment_jobs_submitted(&self, count: u64) {
        self.jobs_submitted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_jobs_claimed(&self) {
        self.jobs_claimed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_jobs_completed(&self) {
        self.jobs_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_jobs_panicked(&self) {
        self.jobs_panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn jobs_submitted(&self) -> u64 {
        self.jobs_submitted.load(Ordering::Relaxed)
    }

    pub fn jobs_claimed(&self) -> u64 {
        self.jobs_claimed.load(Ordering::Relaxed)
    }

    pub fn jobs_completed(&self) -> u64 {
        self.jobs_completed.load(Ordering::Relaxed)
    }

    pub fn jobs_panicked(&self) -> u64 {
        self.jobs_panicked.load(Ordering::Relaxed)
    }

    /// Record how long one process call took
    pub fn record_processing_time(&self, duration: Duration) {
        self.performance.lock().record(duration);
    }

    /// Get performance metrics
    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.performance.lock().clone()
    }

    /// Collect current snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        let performance = self.performance.lock();
        MetricsSnapshot {
            timestamp: Utc::now(),
            jobs_submitted: self.jobs_submitted(),
            jobs_claimed: self.jobs_claimed(),
            jobs_completed: self.jobs_completed(),
            jobs_panicked: self.jobs_panicked(),
            average_processing_time: performance.average(),
            p95_processing_time: performance.percentile(95.0),
        }
    }
}

impl Default for LiveMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling window of process-function durations
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    samples: VecDeque<Duration>,
    last_updated: DateTime<Utc>,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(MAX_SAMPLES),
            last_updated: Utc::now(),
        }
    }

    /// Record one sample, keeping only the last 1000
    pub fn record(&mut self, duration: Duration) {
        if self.samples.len() == MAX_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(duration);
        self.last_updated = Utc::now();
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Get average processing time
    pub fn average(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let total: Duration = self.samples.iter().sum();
        Some(total / self.samples.len() as u32)
    }

    /// Get percentile processing time
    pub fn percentile(&self, percentile: f64) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }

        let mut sorted: Vec<Duration> = self.samples.iter().copied().collect();
        sorted.sort_unstable();

        let index = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted.get(index).copied()
    }
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub jobs_submitted: u64,
    pub jobs_claimed: u64,
    pub jobs_completed: u64,
    pub jobs_panicked: u64,
    pub average_processing_time: Option<Duration>,
    pub p95_processing_time: Option<Duration>,
}

impl MetricsSnapshot {
    /// Share of finished jobs whose process function returned normally
    pub fn success_rate(&self) -> f64 {
        if self.jobs_completed == 0 {
            100.0
        } else {
            let succeeded = self.jobs_completed.saturating_sub(self.jobs_panicked);
            (succeeded as f64 / self.jobs_completed as f64) * 100.0
        }
    }

    /// Jobs claimed but not yet finished
    pub fn jobs_in_progress(&self) -> u64 {
        self.jobs_claimed.saturating_sub(self.jobs_completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_metrics() {
        let metrics = LiveMetrics::new();

        metrics.increment_jobs_submitted(3);
        metrics.increment_jobs_claimed();
        metrics.increment_jobs_claimed();
        metrics.increment_jobs_completed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.jobs_submitted, 3);
        assert_eq!(snapshot.jobs_claimed, 2);
        assert_eq!(snapshot.jobs_completed, 1);
        assert_eq!(snapshot.jobs_in_progress(), 1);
        assert_eq!(snapshot.success_rate(), 100.0);
        assert!(snapshot.average_processing_time.is_none());
    }

    #[test]
    fn test_performance_metrics() {
        let mut perf = PerformanceMetrics::new();

        perf.record(Duration::from_millis(100));
        perf.record(Duration::from_millis(200));
        perf.record(Duration::from_millis(300));

        assert_eq!(perf.average(), Some(Duration::from_millis(200)));
        assert_eq!(perf.percentile(50.0), Some(Duration::from_millis(200)));
        assert_eq!(perf.percentile(100.0), Some(Duration::from_millis(300)));
    }

    #[test]
    fn test_processing_times_reach_performance_metrics() {
        let metrics = LiveMetrics::new();
        let before = metrics.performance_metrics().last_updated();

        metrics.record_processing_time(Duration::from_millis(4));
        metrics.record_processing_time(Duration::from_millis(8));

        let perf = metrics.performance_metrics();
        assert_eq!(perf.sample_count(), 2);
        assert_eq!(perf.average(), Some(Duration::from_millis(6)));
        assert!(perf.last_updated() >= before);
        assert_eq!(metrics.snapshot().p95_processing_time, Some(Duration::from_millis(8)));
    }

    #[test]
    fn test_performance_window_is_bounded() {
        let mut perf = PerformanceMetrics::new();
        for ms in 0..(MAX_SAMPLES as u64 + 10) {
            perf.record(Duration::from_millis(ms));
        }

        assert_eq!(perf.sample_count(), MAX_SAMPLES);
        assert_eq!(perf.percentile(0.0), Some(Duration::from_millis(10)));
    }

    #[test]
    fn test_success_rate_counts_panics() {
        let snapshot = MetricsSnapshot {
            timestamp: Utc::now(),
            jobs_submitted: 10,
            jobs_claimed: 10,
            jobs_completed: 8,
            jobs_panicked: 2,
            average_processing_time: None,
            p95_processing_time: None,
        };

        assert_eq!(snapshot.success_rate(), 75.0);
        assert_eq!(snapshot.jobs_in_progress(), 2);
    }
}
