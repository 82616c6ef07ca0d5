//! Collector: drains completions under the stop policy.
use concur_model::{Job, StopReason};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::StopPolicy;
use crate::progress::Progress;
use crate::scope::{Done, Scope};

/// Jobs collected before the stop condition, fastest first.
#[derive(Debug)]
pub struct Collected {
    pub jobs: Vec<Job>,
    pub reason: StopReason,
}

pub struct Collector<'a> {
    policy: StopPolicy,
    root: &'a Scope,
    progress: &'a dyn Progress,
}

impl<'a> Collector<'a> {
    pub fn new(policy: StopPolicy, root: &'a Scope, progress: &'a dyn Progress) -> Self {
        Self {
            policy,
            root,
            progress,
        }
    }

    /// Receive completed jobs until the policy, the root scope or `total` ends collection.
    ///
    /// The root scope is cancelled on return, whatever the stop condition.
    pub async fn collect(&self, completions: &mut mpsc::UnboundedReceiver<Job>, total: usize) -> Collected {
        let mut jobs: Vec<Job> = Vec::with_capacity(total);

        let reason = loop {
            if jobs.len() == total {
                break StopReason::AllCompleted;
            }

            tokio::select! {
                biased;
                done = self.root.done() => {
                    let reason = match done {
                        Done::DeadlineExceeded => StopReason::GlobalTimeout,
                        Done::Cancelled => StopReason::Cancelled,
                    };
                    warn!(
                        target: "concur.core.collect",
                        collected = jobs.len(),
                        total,
                        ?reason,
                        "run ended before all jobs completed"
                    );
                    break reason;
                }
                received = completions.recv() => {
                    let Some(job) = received else {
                        warn!(
                            target: "concur.core.collect",
                            collected = jobs.len(),
                            total,
                            "all units gone before reporting"
                        );
                        break StopReason::AllCompleted;
                    };

                    let stop = self.stop_after(&job);
                    jobs.push(job);
                    if let Some(last) = jobs.last() {
                        self.progress.on_complete(jobs.len(), total, last);
                    }
                    if let Some(reason) = stop {
                        debug!(target: "concur.core.collect", ?reason, "stop condition met");
                        break reason;
                    }
                }
            }
        };

        self.root.cancel();
        self.progress.on_finish(jobs.len(), total);

        // Arrival order is a race; report order must not be.
        jobs.sort_by(|a, b| a.run_duration.cmp(&b.run_duration).then(a.id.cmp(&b.id)));
        Collected { jobs, reason }
    }

    fn stop_after(&self, job: &Job) -> Option<StopReason> {
        match self.policy {
            StopPolicy::FirstCompletion => Some(StopReason::FirstCompletion),
            StopPolicy::FirstSuccess if job.is_success() => Some(StopReason::FirstSuccess),
            _ => None,
        }
    }
}
