//! # dog-pool: Fixed-Size Worker Pool
//!
//! A bounded set of worker threads drains a FIFO job queue, applying one
//! caller-supplied process function to every job. Callers poll progress or
//! block until the queue drains.
//!
//! ## Guarantees
//!
//! - **FIFO claiming**: jobs are claimed in submission order (completion order
//!   depends on how long each job takes)
//! - **At most one worker per job**: a job is claimed exactly once
//! - **Consistent progress**: `progress()` reads all three collections under a
//!   single lock acquisition, so `completed <= total` always holds
//! - **No lock during processing**: slow jobs never block submitters or other
//!   workers
//! - **Panics are contained**: a panicking process function still moves its
//!   job to completed
//!
//! ## Quick Start
//!
//! ```rust
//! use dog_pool::prelude::*;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let queue = JobQueue::new(3)?;
//! let processed = Arc::new(AtomicUsize::new(0));
//!
//! let counter = processed.clone();
//! queue.start(move |job: &Job<String>| {
//!     counter.fetch_add(job.payload.len(), Ordering::Relaxed);
//! })?;
//!
//! for (id, word) in ["a", "bb", "ccc", "dddd"].into_iter().enumerate() {
//!     queue.submit(Job::new(id as u64, word.to_string()));
//! }
//!
//! queue.wait_all()?;
//! assert_eq!(queue.progress().counts(), (4, 4));
//! assert_eq!(processed.load(Ordering::Relaxed), 10);
//! # Ok::<(), dog_pool::PoolError>(())
//! ```

pub mod config;
pub mod error;
pub mod observability;
pub mod queue;
pub mod types;
mod worker;

pub use config::PoolConfig;
pub use error::{PoolError, PoolResult};
pub use queue::JobQueue;
pub use types::{Job, JobEvent, JobId, JobStatus, Progress};

pub use observability::{LiveMetrics, MetricsSnapshot, ObservabilityLayer};

pub mod prelude {
    pub use crate::{Job, JobId, JobQueue, JobStatus, PoolConfig, PoolError, PoolResult, Progress};
}
