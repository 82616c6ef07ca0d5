use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a job.
///
/// States only move forward: `Pending -> Started -> Running -> {Finished | Errored | TimedOut}`.
/// Skipping intermediate states is allowed (a job that fails to spawn goes straight from
/// `Started` to `Errored`), going back is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// Built, not yet admitted.
    Pending,
    /// Holds an admission slot; process not spawned yet.
    Started,
    /// Process spawned and running.
    Running,
    /// Process exited with code 0.
    Finished,
    /// Process exited non-zero, could not be spawned, or was cancelled.
    Errored,
    /// The job's deadline fired before the process exited.
    TimedOut,
}

impl JobStatus {
    /// Returns `true` if the job will not transition any further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Finished | JobStatus::Errored | JobStatus::TimedOut
        )
    }

    /// Returns `true` if `next` is a legal successor of `self`.
    pub fn can_advance_to(&self, next: JobStatus) -> bool {
        !self.is_terminal() && self.rank() < next.rank()
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Started => 1,
            JobStatus::Running => 2,
            JobStatus::Finished | JobStatus::Errored | JobStatus::TimedOut => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Started => "Started",
            JobStatus::Running => "Running",
            JobStatus::Finished => "Finished",
            JobStatus::Errored => "Errored",
            JobStatus::TimedOut => "TimedOut",
        }
    }
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Pending
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
