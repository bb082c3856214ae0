pub mod ids;
pub mod job;
pub mod progress;
pub mod events;

pub use ids::JobId;
pub use job::{Job, JobStatus};
pub use progress::Progress;
pub use events::JobEvent;
