use serde::{Deserialize, Serialize};

/// Snapshot of the three collections taken under a single lock acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
}

impl Progress {
    pub(crate) fn new(pending: usize, in_progress: usize, completed: usize) -> Self {
        Self {
            completed,
            total: pending + in_progress + completed,
            pending,
            in_progress,
        }
    }

    /// `(completed, total)` pair
    pub fn counts(&self) -> (usize, usize) {
        (self.completed, self.total)
    }

    /// Pending and in-progress are both empty
    pub fn is_drained(&self) -> bool {
        self.completed == self.total
    }

    /// Jobs not yet completed
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_totals() {
        let progress = Progress::new(2, 1, 4);
        assert_eq!(progress.counts(), (4, 7));
        assert_eq!(progress.remaining(), 3);
        assert!(!progress.is_drained());
    }

    #[test]
    fn test_empty_progress_is_drained() {
        assert!(Progress::default().is_drained());
        assert_eq!(Progress::new(0, 0, 5).counts(), (5, 5));
    }

    #[test]
    fn test_remaining_saturates_on_inconsistent_snapshot() {
        let progress = Progress {
            completed: 5,
            total: 3,
            pending: 0,
            in_progress: 0,
        };
        assert_eq!(progress.remaining(), 0);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_remaining_on_deserialized_snapshot() {
        let progress: Progress =
            serde_json::from_str(r#"{"completed":9,"total":1,"pending":0,"in_progress":0}"#).unwrap();
        assert_eq!(progress.remaining(), 0);
    }
}
