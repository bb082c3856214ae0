use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use super::{LiveMetrics, MetricsSnapshot};
use crate::{JobEvent, JobId};

/// Event broadcast plus live counters for one queue instance
#[derive(Clone)]
pub struct ObservabilityLayer {
    queue_id: Uuid,
    event_broadcaster: broadcast::Sender<JobEvent>,
    metrics: Arc<LiveMetrics>,
}

impl ObservabilityLayer {
    /// Create new observability layer
    pub fn new(queue_id: Uuid, event_capacity: usize) -> Self {
        let (event_broadcaster, _) = broadcast::channel(event_capacity);

        Self {
            queue_id,
            event_broadcaster,
            metrics: Arc::new(LiveMetrics::new()),
        }
    }

    pub fn record_job_submitted(&self, job_id: JobId) {
        self.emit(JobEvent::Submitted {
            queue_id: self.queue_id,
            job_id,
            at: Utc::now(),
        });
        self.metrics.increment_jobs_submitted(1);
        debug!(queue_id = %self.queue_id, %job_id, "job submitted");
    }

    pub fn record_job_claimed(&self, job_id: JobId, worker_id: usize) {
        self.emit(JobEvent::Claimed {
            queue_id: self.queue_id,
            job_id,
            worker_id,
            at: Utc::now(),
        });
        self.metrics.increment_jobs_claimed();
        debug!(%job_id, worker_id, "job claimed");
    }

    pub fn record_job_completed(&self, job_id: JobId, worker_id: usize, elapsed: Duration) {
        self.emit(JobEvent::Completed {
            queue_id: self.queue_id,
            job_id,
            worker_id,
            at: Utc::now(),
        });
        self.metrics.increment_jobs_completed();
        self.metrics.record_processing_time(elapsed);
        debug!(%job_id, worker_id, elapsed_ms = elapsed.as_millis() as u64, "job completed");
    }

    /// Panicked jobs still count as completed
    pub fn record_job_panicked(&self, job_id: JobId, worker_id: usize, message: String, elapsed: Duration) {
        self.emit(JobEvent::Panicked {
            queue_id: self.queue_id,
            job_id,
            worker_id,
            message,
            at: Utc::now(),
        });
        self.metrics.increment_jobs_panicked();
        self.metrics.increment_jobs_completed();
        self.metrics.record_processing_time(elapsed);
    }

    // No subscribers is not an error
    fn emit(&self, event: JobEvent) {
        let _ = self.event_broadcaster.send(event);
    }

    /// Subscribe to the event stream
    pub fn event_stream(&self) -> broadcast::Receiver<JobEvent> {
        self.event_broadcaster.subscribe()
    }

    /// Get live metrics
    pub fn metrics(&self) -> &LiveMetrics {
        &self.metrics
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
