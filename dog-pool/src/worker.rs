use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, info_span, trace, warn, Span};

use crate::queue::Shared;
use crate::{Job, PoolResult};

/// One pool thread: claims jobs FIFO and runs the process function on them
pub(crate) struct Worker<P, F> {
    id: usize,
    shared: Arc<Shared<P>>,
    process: Arc<F>,
    /// Span current when the pool was started; worker spans nest under it
    parent: Span,
}

impl<P, F> Worker<P, F>
where
    P: Send + Sync + 'static,
    F: Fn(&Job<P>) + Send + Sync + 'static,
{
    pub(crate) fn new(id: usize, shared: Arc<Shared<P>>, process: Arc<F>, parent: Span) -> Self {
        Self {
            id,
            shared,
            process,
            parent,
        }
    }

    pub(crate) fn spawn(self, thread_name: String) -> PoolResult<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn(move || self.run())?;
        Ok(handle)
    }

    fn run(self) {
        let span = info_span!(parent: &self.parent, "worker", queue_id = %self.shared.queue_id, worker_id = self.id);
        let _enter = span.enter();
        debug!("worker started");

        while let Some(job) = self.next_job() {
            self.process_job(job);
        }

        debug!("worker shutdown");
    }

    /// Block until a job can be claimed; `None` once a stop was requested
    fn next_job(&self) -> Option<Arc<Job<P>>> {
        let mut state = self.shared.state.lock();
        loop {
            if state.stopping {
                return None;
            }
            if let Some(job) = state.claim() {
                self.shared.observability.record_job_claimed(job.id, self.id);
                return Some(job);
            }
            trace!("no pending jobs, waiting");
            self.shared.job_ready.wait(&mut state);
        }
    }

    fn process_job(&self, job: Arc<Job<P>>) {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.process)(job.as_ref())));
        let elapsed = started.elapsed();
        let job_id = job.id;

        let mut state = self.shared.state.lock();
        state.complete(job);

        match outcome {
            Ok(()) => self.shared.observability.record_job_completed(job_id, self.id, elapsed),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(%job_id, %message, "process function panicked, job recorded as completed");
                self.shared
                    .observability
                    .record_job_panicked(job_id, self.id, message, elapsed);
            }
        }

        if state.is_drained() {
            trace!("queue drained");
            self.shared.drained.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::JobQueue;
    use tracing_test::traced_test;

    #[test]
    fn test_panic_message_extraction() {
        let err = panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "static message");

        let err = panic::catch_unwind(|| panic!("formatted {}", 42)).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "formatted 42");

        let err = panic::catch_unwind(|| std::panic::panic_any(7u8)).unwrap_err();
        assert_eq!(panic_message(err.as_ref()), "non-string panic payload");
    }

    #[test]
    #[traced_test]
    fn test_panicking_process_still_completes_job() {
        let queue = JobQueue::new(1).unwrap();
        queue
            .start(|job: &Job<u64>| {
                if job.payload == 0 {
                    panic!("cannot process zero");
                }
            })
            .unwrap();

        queue.submit(Job::new(1, 0));
        queue.submit(Job::new(2, 5));
        queue.wait_all().unwrap();

        assert_eq!(queue.progress().counts(), (2, 2));
        assert_eq!(queue.metrics().jobs_panicked, 1);
        assert!(logs_contain("process function panicked"));
        assert!(logs_contain("cannot process zero"));
    }
}
