use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Job;
use crate::duration::{serde_human, serde_human_ms};

/// Why the collector stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// Every dispatched job reported a terminal status.
    AllCompleted,
    /// A job returned 0 under the stop-on-first-success policy.
    FirstSuccess,
    /// One job completed under the stop-on-first-completion policy.
    FirstCompletion,
    /// The run-level deadline fired before all jobs completed.
    GlobalTimeout,
    /// The run was cancelled from outside (operator interrupt).
    Cancelled,
}

/// Run-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInfo {
    /// Worker budget actually used.
    pub concurrency_limit: usize,
    /// Wall time from start of the run until collection stopped.
    #[serde(rename = "systemRuntime", with = "serde_human_ms")]
    pub elapsed: Duration,
    /// The command template.
    pub original_command: String,
    /// Resolved run-level timeout.
    #[serde(with = "serde_human")]
    pub timeout: Duration,
    /// Number of jobs handed to the dispatcher.
    pub dispatched: usize,
    pub stop_reason: StopReason,
}

/// Collected jobs, fastest first, plus run metadata.
///
/// May hold fewer jobs than were dispatched when the run stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(rename = "command")]
    pub jobs: Vec<Job>,
    pub info: RunInfo,
}

impl RunResult {
    /// `true` if some dispatched jobs were never collected.
    pub fn is_partial(&self) -> bool {
        self.jobs.len() < self.info.dispatched
    }

    /// Collected jobs that ended with a non-zero return code.
    pub fn failed(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|j| j.return_code != 0)
    }
}
