//! Job tracking phases
//!
//! `Idle -> Starting -> Tracking -> Reconciling -> Done`, or `Tracking -> Failed`.
//! `Idle` is both the initial state and the re-entry state after a job ends.

use serde::{Deserialize, Serialize};

/// Where a job client is in the lifecycle of its current job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    #[default]
    Idle,
    Starting,
    Tracking,
    Reconciling,
    Done,
    Failed,
}

impl JobPhase {
    /// Check whether moving from `self` to `next` is allowed
    pub fn can_transition_to(self, next: JobPhase) -> bool {
        use JobPhase::*;

        matches!(
            (self, next),
            (Idle, Starting)
                // start rejected, nothing was created
                | (Starting, Idle)
                | (Starting, Tracking)
                | (Tracking, Reconciling)
                | (Tracking, Failed)
                // explicit cancel
                | (Tracking, Idle)
                | (Reconciling, Done)
                | (Done, Idle)
                | (Failed, Idle)
        )
    }

    /// Whether a job is in flight
    pub fn is_active(self) -> bool {
        matches!(
            self,
            JobPhase::Starting | JobPhase::Tracking | JobPhase::Reconciling
        )
    }

    /// Whether the last job has produced its outcome
    pub fn is_terminal(self) -> bool {
        matches!(self, JobPhase::Done | JobPhase::Failed)
    }
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPhase::Idle => write!(f, "Idle"),
            JobPhase::Starting => write!(f, "Starting"),
            JobPhase::Tracking => write!(f, "Tracking"),
            JobPhase::Reconciling => write!(f, "Reconciling"),
            JobPhase::Done => write!(f, "Done"),
            JobPhase::Failed => write!(f, "Failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            JobPhase::Idle,
            JobPhase::Starting,
            JobPhase::Tracking,
            JobPhase::Reconciling,
            JobPhase::Done,
            JobPhase::Idle,
        ];
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_failure_path_transitions() {
        assert!(JobPhase::Tracking.can_transition_to(JobPhase::Failed));
        assert!(JobPhase::Failed.can_transition_to(JobPhase::Idle));
    }

    #[test]
    fn test_no_phase_is_skipped() {
        assert!(!JobPhase::Idle.can_transition_to(JobPhase::Tracking));
        assert!(!JobPhase::Starting.can_transition_to(JobPhase::Reconciling));
        assert!(!JobPhase::Tracking.can_transition_to(JobPhase::Done));
        assert!(!JobPhase::Starting.can_transition_to(JobPhase::Failed));
        assert!(!JobPhase::Done.can_transition_to(JobPhase::Starting));
    }

    #[test]
    fn test_activity() {
        assert!(!JobPhase::Idle.is_active());
        assert!(JobPhase::Tracking.is_active());
        assert!(JobPhase::Done.is_terminal());
        assert!(JobPhase::Failed.is_terminal());
        assert!(!JobPhase::Reconciling.is_terminal());
    }
}
