use serde::{Deserialize, Serialize};

use super::JobId;

/// Unit of work: an identifier plus a payload the process function interprets.
///
/// The queue never inspects or mutates the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job<P> {
    pub id: JobId,
    pub payload: P,
}

impl<P> Job<P> {
    /// Create a new job
    pub fn new(id: u64, payload: P) -> Self {
        Self {
            id: JobId(id),
            payload,
        }
    }

    /// Get the job ID
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Get the payload
    pub fn payload(&self) -> &P {
        &self.payload
    }
}

/// Which of the three queue collections currently holds a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Submitted, not yet claimed by a worker
    Pending,

    /// Claimed by a worker, process function still running
    InProgress,

    /// Process function returned (or panicked)
    Completed,
}

impl JobStatus {
    /// Check if the job has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Get the status name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_construction() {
        let job = Job::new(3, "payload");
        assert_eq!(job.id(), JobId(3));
        assert_eq!(*job.payload(), "payload");
    }

    #[test]
    fn test_status_names() {
        assert_eq!(JobStatus::Pending.name(), "pending");
        assert_eq!(JobStatus::InProgress.name(), "in_progress");
        assert!(JobStatus::Completed.is_terminal());
        assert!(!JobStatus::InProgress.is_terminal());
    }
}
