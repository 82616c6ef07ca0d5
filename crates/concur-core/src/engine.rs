use std::sync::Arc;
use std::time::Duration;

use concur_model::{RunInfo, RunResult};
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::builder::build_jobs;
use crate::collect::Collector;
use crate::config::RunConfig;
use crate::dispatch::{Dispatch, Dispatcher};
use crate::error::{ConfigError, CoreError};
use crate::progress::{NoProgress, Progress};
use crate::runner::Runner;
use crate::scope::Scope;

/// Entry point: build, dispatch and collect one run.
pub struct Engine {
    runner: Arc<dyn Runner>,
    progress: Arc<dyn Progress>,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(runner: Arc<dyn Runner>) -> Self {
        Self {
            runner,
            progress: Arc::new(NoProgress),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn Progress>) -> Self {
        self.progress = progress;
        self
    }

    /// Cancelling `token` ends any run of this engine early, as an interrupt would.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Execute `template` once per target.
    ///
    /// Fails only on configuration errors, before anything is dispatched. Timeouts and
    /// failing commands are part of the returned result.
    #[instrument(level = "debug", skip(self, targets, cfg), fields(runner = self.runner.name(), targets = targets.len()))]
    pub async fn run<S: AsRef<str>>(
        &self,
        template: &str,
        targets: &[S],
        cfg: &RunConfig,
    ) -> Result<RunResult, CoreError> {
        if template.trim().is_empty() {
            return Err(ConfigError::EmptyTemplate.into());
        }
        let timeouts = cfg.validate()?;

        let started = Instant::now();
        let jobs = build_jobs(template, targets, &cfg.token);
        let total = jobs.len();
        let root = Scope::with_token(self.cancel.child_token(), timeouts.global);
        let dispatcher = Dispatcher::new(
            Arc::clone(&self.runner),
            cfg.concurrency.limit(total),
            root.clone(),
            timeouts.job,
        );
        let limit = dispatcher.limit();
        info!(target: "concur.core.engine", jobs = total, limit, stop = ?cfg.stop, "run starting");

        self.progress.on_start(total);
        let Dispatch {
            mut completions,
            units,
        } = dispatcher.dispatch(jobs);

        let collected = Collector::new(cfg.stop, &root, self.progress.as_ref())
            .collect(&mut completions, total)
            .await;
        let elapsed = started.elapsed();

        drop(completions);
        wind_down(units, cfg.shutdown_grace).await;

        info!(
            target: "concur.core.engine",
            collected = collected.jobs.len(),
            reason = ?collected.reason,
            elapsed_ms = elapsed.as_millis() as u64,
            "run finished"
        );

        Ok(RunResult {
            jobs: collected.jobs,
            info: RunInfo {
                concurrency_limit: limit,
                elapsed,
                original_command: template.to_string(),
                timeout: timeouts.global,
                dispatched: total,
                stop_reason: collected.reason,
            },
        })
    }
}

/// Wait for cancelled units to stop, aborting whatever is left after `grace`.
async fn wind_down(mut units: JoinSet<()>, grace: Duration) {
    let joined = timeout(grace, async {
        while let Some(res) = units.join_next().await {
            if let Err(e) = res
                && e.is_panic()
            {
                error!(target: "concur.core.engine", error = %e, "execution unit panicked");
            }
        }
    })
    .await;

    if joined.is_err() {
        warn!(
            target: "concur.core.engine",
            remaining = units.len(),
            "units did not stop within grace; aborting"
        );
        units.shutdown().await;
    }
}
