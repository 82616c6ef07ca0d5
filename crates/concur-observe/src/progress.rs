use concur_core::Progress;
use concur_model::{Job, JobStatus, fmt_duration};
use tracing::{debug, info, warn};

/// Progress observer that reports completions through the log.
///
/// One `info!` line per collected job on target `concur.progress`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl LogProgress {
    pub fn new() -> Self {
        Self
    }
}

#[inline]
pub fn message_for(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Finished => "job finished",
        JobStatus::Errored => "job failed",
        JobStatus::TimedOut => "job timed out",
        JobStatus::Pending | JobStatus::Started | JobStatus::Running => "job reported before completion",
    }
}

impl Progress for LogProgress {
    fn on_start(&self, total: usize) {
        debug!(target: "concur.progress", total, "run started");
    }

    fn on_complete(&self, done: usize, total: usize, job: &Job) {
        let msg = message_for(job.status);
        let percent = if total == 0 { 100 } else { done * 100 / total };
        info!(
            target: "concur.progress",
            done,
            total,
            percent,
            job = %job.id,
            code = job.return_code,
            runtime = %fmt_duration(job.run_duration),
            "{msg}"
        );
    }

    fn on_finish(&self, done: usize, total: usize) {
        if done < total {
            warn!(target: "concur.progress", done, total, "run ended with jobs outstanding");
        } else {
            debug!(target: "concur.progress", done, total, "run complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use concur_model::JobId;

    use super::*;

    #[test]
    fn terminal_statuses_have_distinct_messages() {
        let msgs = [
            message_for(JobStatus::Finished),
            message_for(JobStatus::Errored),
            message_for(JobStatus::TimedOut),
        ];
        assert_ne!(msgs[0], msgs[1]);
        assert_ne!(msgs[1], msgs[2]);
    }

    #[test]
    fn observing_never_touches_the_job() {
        let mut job = Job::new(JobId(4), "ping {{1}}", "a", "ping a");
        job.advance(JobStatus::Finished);
        let before = job.clone();

        let progress = LogProgress::new();
        progress.on_start(1);
        progress.on_complete(1, 1, &job);
        progress.on_finish(1, 1);

        assert_eq!(job, before);
    }
}
