use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use concur_model::{Job, JobStatus, NO_EXIT_CODE};
use tokio::time::Instant;
use tracing::{trace, warn};

use crate::scope::Scope;

/// Executes one job.
///
/// Implementations drive the job to a terminal status and must return promptly once
/// `scope` is done. Timing is recorded by [`execute`], not by the runner.
#[async_trait]
pub trait Runner: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn run(&self, job: &mut Job, scope: &Scope);
}

/// Run `job` through `runner`, recording start/end time and run duration.
pub async fn execute(runner: &dyn Runner, job: &mut Job, scope: &Scope, job_timeout: Duration) {
    job.job_timeout = job_timeout;
    let wall_start = SystemTime::now();
    let started = Instant::now();
    job.start_time = Some(wall_start);

    trace!(target: "concur.core.runner", runner = runner.name(), job = %job.id, "run");
    runner.run(job, scope).await;

    if !job.status.is_terminal() {
        warn!(
            target: "concur.core.runner",
            runner = runner.name(),
            job = %job.id,
            status = %job.status,
            "runner returned a non-terminal job; marking errored"
        );
        job.advance(JobStatus::Errored);
        job.return_code = NO_EXIT_CODE;
    }

    let elapsed = started.elapsed();
    job.run_duration = elapsed;
    job.end_time = Some(wall_start + elapsed);
}
