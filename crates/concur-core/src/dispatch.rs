//! Dispatcher: one execution unit per job, gated by the admission pool.
use std::sync::Arc;
use std::time::Duration;

use concur_model::{Job, JobStatus};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, trace};

use crate::runner::{Runner, execute};
use crate::scope::Scope;

/// Handles to a dispatched batch.
pub struct Dispatch {
    /// Completed jobs, in completion order.
    pub completions: mpsc::UnboundedReceiver<Job>,
    /// The execution units; join or abort them once collection is over.
    pub units: JoinSet<()>,
}

pub struct Dispatcher {
    runner: Arc<dyn Runner>,
    admission: Arc<Semaphore>,
    limit: usize,
    root: Scope,
    job_timeout: Duration,
}

impl Dispatcher {
    /// `limit` is the number of jobs allowed to execute at the same time.
    ///
    /// Capped at [`Semaphore::MAX_PERMITS`].
    pub fn new(runner: Arc<dyn Runner>, limit: usize, root: Scope, job_timeout: Duration) -> Self {
        let limit = limit.min(Semaphore::MAX_PERMITS);
        Self {
            runner,
            admission: Arc::new(Semaphore::new(limit)),
            limit,
            root,
            job_timeout,
        }
    }

    /// Admission slots in total.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Free admission slots right now.
    pub fn available(&self) -> usize {
        self.admission.available_permits()
    }

    /// Start one unit per job. Must be called within a tokio runtime.
    ///
    /// A unit waits for an admission slot, runs its job in a child of the root scope,
    /// gives the slot back and reports the job. A unit still waiting when the root
    /// scope ends exits without running its job.
    pub fn dispatch(&self, jobs: Vec<Job>) -> Dispatch {
        let (tx, completions) = mpsc::unbounded_channel();
        let mut units = JoinSet::new();

        debug!(
            target: "concur.core.dispatch",
            jobs = jobs.len(),
            slots = self.available(),
            "dispatching"
        );

        for mut job in jobs {
            let runner = Arc::clone(&self.runner);
            let admission = Arc::clone(&self.admission);
            let root = self.root.clone();
            let tx = tx.clone();
            let job_timeout = self.job_timeout;

            units.spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = root.done() => {
                        trace!(target: "concur.core.dispatch", job = %job.id, "run over before admission");
                        return;
                    }
                    permit = admission.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return,
                    },
                };

                job.advance(JobStatus::Started);
                let scope = root.child(job_timeout);
                execute(runner.as_ref(), &mut job, &scope, job_timeout).await;
                scope.cancel();
                drop(permit);

                trace!(target: "concur.core.dispatch", job = %job.id, status = %job.status, "unit done");
                // The collector may already be gone; the job is then simply not collected.
                let _ = tx.send(job);
            });
        }

        Dispatch { completions, units }
    }
}
