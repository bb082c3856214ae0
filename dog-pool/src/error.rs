use thiserror::Error;

use crate::JobId;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Errors surfaced by the worker pool
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(usize),

    #[error("Workers have already been started")]
    AlreadyStarted,

    #[error("Duplicate job id: {0}")]
    DuplicateJobId(JobId),

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(String),

    #[error("Pool has been shut down")]
    Shutdown,

    #[error("Worker {0} terminated abnormally")]
    WorkerPanicked(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for PoolError {
    fn from(err: std::io::Error) -> Self {
        Self::WorkerSpawn(err.to_string())
    }
}
