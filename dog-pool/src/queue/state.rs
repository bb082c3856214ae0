use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::{Job, JobId, JobStatus, Progress};

/// The three collections partitioning every job ever submitted.
///
/// Always accessed under the queue's mutex; nothing here synchronizes.
pub(crate) struct QueueState<P> {
    pending: VecDeque<Arc<Job<P>>>,
    in_progress: HashMap<JobId, Arc<Job<P>>>,
    completed: HashMap<JobId, Arc<Job<P>>>,
    /// Occurrences of each id waiting in `pending`, for duplicate detection
    pending_ids: HashMap<JobId, usize>,
    pub(crate) stopping: bool,
}

impl<P> QueueState<P> {
    pub(crate) fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            in_progress: HashMap::new(),
            completed: HashMap::new(),
            pending_ids: HashMap::new(),
            stopping: false,
        }
    }

    pub(crate) fn push(&mut self, job: Job<P>) {
        *self.pending_ids.entry(job.id).or_insert(0) += 1;
        self.pending.push_back(Arc::new(job));
    }

    pub(crate) fn contains(&self, id: JobId) -> bool {
        self.pending_ids.contains_key(&id)
            || self.in_progress.contains_key(&id)
            || self.completed.contains_key(&id)
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Move the head of `pending` into `in_progress`
    pub(crate) fn claim(&mut self) -> Option<Arc<Job<P>>> {
        let job = self.pending.pop_front()?;
        if let Some(count) = self.pending_ids.get_mut(&job.id) {
            *count -= 1;
            if *count == 0 {
                self.pending_ids.remove(&job.id);
            }
        }
        self.in_progress.insert(job.id, job.clone());
        Some(job)
    }

    /// Move a claimed job from `in_progress` into `completed`
    pub(crate) fn complete(&mut self, job: Arc<Job<P>>) {
        self.in_progress.remove(&job.id);
        self.completed.insert(job.id, job);
    }

    pub(crate) fn progress(&self) -> Progress {
        Progress::new(self.pending.len(), self.in_progress.len(), self.completed.len())
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.in_progress.is_empty()
    }

    pub(crate) fn status(&self, id: JobId) -> Option<JobStatus> {
        if self.completed.contains_key(&id) {
            Some(JobStatus::Completed)
        } else if self.in_progress.contains_key(&id) {
            Some(JobStatus::InProgress)
        } else if self.pending_ids.contains_key(&id) {
            Some(JobStatus::Pending)
        } else {
            None
        }
    }

    pub(crate) fn completed_ids(&self) -> Vec<JobId> {
        let mut ids: Vec<JobId> = self.completed.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub(crate) fn completed_job(&self, id: JobId) -> Option<Arc<Job<P>>> {
        self.completed.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(ids: &[u64]) -> QueueState<&'static str> {
        let mut state = QueueState::new();
        for id in ids {
            state.push(Job::new(*id, "p"));
        }
        state
    }

    #[test]
    fn test_claim_is_fifo() {
        let mut state = state_with(&[3, 1, 2]);

        let claimed: Vec<u64> = std::iter::from_fn(|| state.claim()).map(|job| job.id.0).collect();

        assert_eq!(claimed, vec![3, 1, 2]);
        assert!(state.claim().is_none());
    }

    #[test]
    fn test_transitions_partition_ids() {
        let mut state = state_with(&[1, 2, 3]);
        assert_eq!(state.progress(), Progress::new(3, 0, 0));

        let first = state.claim().unwrap();
        assert_eq!(state.status(JobId(1)), Some(JobStatus::InProgress));
        assert_eq!(state.status(JobId(2)), Some(JobStatus::Pending));
        assert_eq!(state.progress(), Progress::new(2, 1, 0));

        state.complete(first);
        assert_eq!(state.status(JobId(1)), Some(JobStatus::Completed));
        assert_eq!(state.progress(), Progress::new(2, 0, 1));
        assert_eq!(state.progress().total, 3);
        assert!(!state.is_drained());
    }

    #[test]
    fn test_drained_after_all_complete() {
        let mut state = state_with(&[10, 20]);
        while let Some(job) = state.claim() {
            state.complete(job);
        }

        assert!(state.is_drained());
        assert_eq!(state.progress().counts(), (2, 2));
        assert_eq!(state.completed_ids(), vec![JobId(10), JobId(20)]);
        assert_eq!(state.completed_job(JobId(20)).unwrap().payload, "p");
    }

    #[test]
    fn test_contains_covers_every_collection() {
        let mut state = state_with(&[1, 2, 3]);
        let first = state.claim().unwrap();
        state.complete(first);
        state.claim();

        assert!(state.contains(JobId(1)));
        assert!(state.contains(JobId(2)));
        assert!(state.contains(JobId(3)));
        assert!(!state.contains(JobId(4)));
        assert_eq!(state.status(JobId(4)), None);
    }

    #[test]
    fn test_duplicate_pending_id_keeps_index() {
        let mut state = state_with(&[5, 5]);
        state.claim();
        assert_eq!(state.status(JobId(5)), Some(JobStatus::InProgress));
        assert_eq!(state.pending_ids.get(&JobId(5)), Some(&1));
        state.claim();
        assert!(!state.pending_ids.contains_key(&JobId(5)));
    }
}
