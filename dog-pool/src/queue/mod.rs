pub(crate) mod state;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::broadcast;
use tracing::{info, instrument, trace, Span};
use uuid::Uuid;

use crate::observability::{MetricsSnapshot, ObservabilityLayer};
use crate::worker::Worker;
use crate::{Job, JobEvent, JobId, JobStatus, PoolConfig, PoolError, PoolResult, Progress};
use state::QueueState;

/// State shared between the queue handle and its worker threads
pub(crate) struct Shared<P> {
    pub(crate) queue_id: Uuid,
    pub(crate) state: Mutex<QueueState<P>>,
    /// Signalled on submit; workers wait here while pending is empty
    pub(crate) job_ready: Condvar,
    /// Signalled when the last outstanding job completes
    pub(crate) drained: Condvar,
    pub(crate) observability: ObservabilityLayer,
}

impl<P> Shared<P> {
    fn wait_drained(&self) -> PoolResult<()> {
        let mut state = self.state.lock();
        while !state.is_drained() {
            // In-progress jobs still finish after a stop; pending ones never will
            if state.stopping && state.has_pending() {
                return Err(PoolError::Shutdown);
            }
            trace!(queue_id = %self.queue_id, "waiting for queue to drain");
            self.drained.wait(&mut state);
        }
        Ok(())
    }

    fn wait_drained_until(&self, deadline: Instant) -> bool {
        let mut state = self.state.lock();
        while !state.is_drained() {
            if state.stopping && state.has_pending() {
                return false;
            }
            if self.drained.wait_until(&mut state, deadline).timed_out() {
                return state.is_drained();
            }
        }
        true
    }

    fn request_stop(&self) {
        self.state.lock().stopping = true;
        self.job_ready.notify_all();
        self.drained.notify_all();
    }
}

/// Fixed-size worker pool draining a FIFO job queue.
///
/// Jobs move pending → in-progress → completed. All three collections live
/// behind one mutex owned by this instance, so independent queues never
/// contend with each other. The process function always runs without the
/// lock held.
pub struct JobQueue<P> {
    shared: Arc<Shared<P>>,
    config: PoolConfig,
    started: AtomicBool,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<P: Send + Sync + 'static> JobQueue<P> {
    /// Create a queue served by `worker_count` threads once started
    pub fn new(worker_count: usize) -> PoolResult<Self> {
        Self::with_config(PoolConfig::new(worker_count))
    }

    /// Create a queue from a full configuration
    pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;

        let queue_id = Uuid::new_v4();
        let shared = Arc::new(Shared {
            queue_id,
            state: Mutex::new(QueueState::new()),
            job_ready: Condvar::new(),
            drained: Condvar::new(),
            observability: ObservabilityLayer::new(queue_id, config.event_capacity),
        });

        info!(%queue_id, worker_count = config.worker_count, "job queue created");
        Ok(Self {
            shared,
            config,
            started: AtomicBool::new(false),
            handles: Mutex::new(Vec::new()),
        })
    }

    /// Append a job to the tail of the pending queue and wake one worker.
    ///
    /// Never blocks on capacity. Identifier uniqueness is not checked; use
    /// [`try_submit`](Self::try_submit) for that.
    ///
    /// Ids are expected to be unique. The in-progress and completed
    /// collections are keyed by id, so with a duplicate:
    ///
    /// - `progress().total` counts the id once, not once per submission.
    /// - The first copy to finish also clears the other copy's claim, so
    ///   [`wait_all`](Self::wait_all) may return while that copy is still
    ///   running.
    pub fn submit(&self, job: Job<P>) {
        let mut state = self.shared.state.lock();
        let job_id = job.id;
        state.push(job);
        self.shared.observability.record_job_submitted(job_id);
        self.shared.job_ready.notify_one();
    }

    /// Like [`submit`](Self::submit), but rejects an id the queue already holds
    pub fn try_submit(&self, job: Job<P>) -> PoolResult<()> {
        let mut state = self.shared.state.lock();
        if state.contains(job.id) {
            return Err(PoolError::DuplicateJobId(job.id));
        }
        let job_id = job.id;
        state.push(job);
        self.shared.observability.record_job_submitted(job_id);
        self.shared.job_ready.notify_one();
        Ok(())
    }

    /// Append many jobs under one lock acquisition, preserving their order
    pub fn submit_batch<I>(&self, jobs: I)
    where
        I: IntoIterator<Item = Job<P>>,
    {
        let mut state = self.shared.state.lock();
        for job in jobs {
            let job_id = job.id;
            state.push(job);
            self.shared.observability.record_job_submitted(job_id);
        }
        self.shared.job_ready.notify_all();
    }

    /// Launch `worker_count` threads running `process` on every claimed job.
    ///
    /// Returns immediately. A second call fails with
    /// [`PoolError::AlreadyStarted`]. A panic inside `process` is caught and
    /// the job is still recorded as completed.
    #[instrument(skip(self, process), fields(queue_id = %self.shared.queue_id, worker_count = self.config.worker_count))]
    pub fn start<F>(&self, process: F) -> PoolResult<()>
    where
        F: Fn(&Job<P>) + Send + Sync + 'static,
    {
        if self.shared.state.lock().stopping {
            return Err(PoolError::Shutdown);
        }
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(PoolError::AlreadyStarted);
        }

        let process = Arc::new(process);
        let mut handles = self.handles.lock();
        for worker_id in 0..self.config.worker_count {
            let worker = Worker::new(worker_id, self.shared.clone(), process.clone(), Span::current());
            let thread_name = format!("{}-{}", self.config.thread_name_prefix, worker_id);
            handles.push(worker.spawn(thread_name)?);
        }

        info!("workers started");
        Ok(())
    }

    /// `completed` and `total` (plus pending/in-progress) from one snapshot
    pub fn progress(&self) -> Progress {
        self.shared.state.lock().progress()
    }

    /// Block until every job submitted so far has completed.
    ///
    /// Jobs submitted concurrently with or after the return are not covered.
    /// Fails with [`PoolError::Shutdown`] if the pool was stopped while jobs
    /// were still pending. Never returns if jobs are pending and
    /// [`start`](Self::start) is never called.
    pub fn wait_all(&self) -> PoolResult<()> {
        self.shared.wait_drained()
    }

    /// Bounded [`wait_all`](Self::wait_all); `true` if the queue drained in time
    pub fn wait_all_timeout(&self, timeout: Duration) -> bool {
        self.shared.wait_drained_until(Instant::now() + timeout)
    }

    /// [`wait_all`](Self::wait_all) for async callers, run on tokio's blocking pool
    pub async fn wait_all_async(&self) -> PoolResult<()> {
        let shared = self.shared.clone();
        tokio::task::spawn_blocking(move || shared.wait_drained())
            .await
            .map_err(|e| PoolError::Internal(format!("drain wait join error: {e}")))?
    }

    /// Stop every worker and join its thread.
    ///
    /// Workers finish the job they are running, then exit; pending jobs stay
    /// pending. Must not be called from inside the process function.
    #[instrument(skip(self), fields(queue_id = %self.shared.queue_id))]
    pub fn shutdown(&self) -> PoolResult<()> {
        self.shared.request_stop();

        let handles = std::mem::take(&mut *self.handles.lock());
        let mut result = Ok(());
        for (worker_id, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                result = Err(PoolError::WorkerPanicked(worker_id));
            }
        }

        info!(progress = ?self.progress(), "job queue shut down");
        result
    }
}

impl<P> JobQueue<P> {
    /// Which collection currently holds `id`
    pub fn status(&self, id: JobId) -> Option<JobStatus> {
        self.shared.state.lock().status(id)
    }

    /// Ids of all completed jobs, ascending
    pub fn completed_ids(&self) -> Vec<JobId> {
        self.shared.state.lock().completed_ids()
    }

    pub fn completed_job(&self, id: JobId) -> Option<Arc<Job<P>>> {
        self.shared.state.lock().completed_job(id)
    }

    pub fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Per-instance id carried by spans and events
    pub fn queue_id(&self) -> Uuid {
        self.shared.queue_id
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Subscribe to job lifecycle events
    pub fn events(&self) -> broadcast::Receiver<JobEvent> {
        self.shared.observability.event_stream()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.observability.snapshot()
    }

    pub fn observability(&self) -> &ObservabilityLayer {
        &self.shared.observability
    }
}

impl<P> fmt::Debug for JobQueue<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueue")
            .field("queue_id", &self.shared.queue_id)
            .field("worker_count", &self.config.worker_count)
            .field("started", &self.is_started())
            .field("progress", &self.shared.state.lock().progress())
            .finish()
    }
}

// Workers hold their own handle to the shared state, so stop them explicitly
impl<P> Drop for JobQueue<P> {
    fn drop(&mut self) {
        self.shared.request_stop();
    }
}
