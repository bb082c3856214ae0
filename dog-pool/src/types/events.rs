use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JobId;

/// Job lifecycle events broadcast by the observability layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobEvent {
    /// Job was appended to the pending queue
    Submitted {
        queue_id: Uuid,
        job_id: JobId,
        at: DateTime<Utc>,
    },

    /// Job was claimed by a worker
    Claimed {
        queue_id: Uuid,
        job_id: JobId,
        worker_id: usize,
        at: DateTime<Utc>,
    },

    /// Process function returned and the job moved to completed
    Completed {
        queue_id: Uuid,
        job_id: JobId,
        worker_id: usize,
        at: DateTime<Utc>,
    },

    /// Process function panicked; the job still moved to completed
    Panicked {
        queue_id: Uuid,
        job_id: JobId,
        worker_id: usize,
        message: String,
        at: DateTime<Utc>,
    },
}

impl JobEvent {
    /// Get event type name as string
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Submitted { .. } => "submitted",
            Self::Claimed { .. } => "claimed",
            Self::Completed { .. } => "completed",
            Self::Panicked { .. } => "panicked",
        }
    }

    /// Get the job ID from any event
    pub fn job_id(&self) -> JobId {
        match self {
            Self::Submitted { job_id, .. }
            | Self::Claimed { job_id, .. }
            | Self::Completed { job_id, .. }
            | Self::Panicked { job_id, .. } => *job_id,
        }
    }

    /// Get the originating queue from any event
    pub fn queue_id(&self) -> Uuid {
        match self {
            Self::Submitted { queue_id, .. }
            | Self::Claimed { queue_id, .. }
            | Self::Completed { queue_id, .. }
            | Self::Panicked { queue_id, .. } => *queue_id,
        }
    }

    /// Get the timestamp from any event
    pub fn timestamp(&self) -> &DateTime<Utc> {
        match self {
            Self::Submitted { at, .. }
            | Self::Claimed { at, .. }
            | Self::Completed { at, .. }
            | Self::Panicked { at, .. } => at,
        }
    }

    /// Serialize the event for log shipping
    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_accessors() {
        let queue_id = Uuid::new_v4();
        let at = Utc::now();
        let event = JobEvent::Claimed {
            queue_id,
            job_id: JobId(9),
            worker_id: 2,
            at,
        };

        assert_eq!(event.event_name(), "claimed");
        assert_eq!(event.job_id(), JobId(9));
        assert_eq!(event.queue_id(), queue_id);
        assert_eq!(event.timestamp(), &at);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_event_json_shape() {
        let event = JobEvent::Submitted {
            queue_id: Uuid::nil(),
            job_id: JobId(1),
            at: Utc::now(),
        };

        let json = event.to_json().unwrap();
        assert!(json.starts_with("{\"Submitted\":"));
        assert!(json.contains("\"job_id\":1"));
    }
}
