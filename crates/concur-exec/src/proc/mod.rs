use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use concur_core::{Done, Runner, Scope};
use concur_model::{Job, JobStatus, NO_EXIT_CODE, fmt_duration};

use crate::{
    error::ExecError,
    util::{cmd_program, kill_graceful, split_command},
};

/// Process settings shared by every job of a run.
#[derive(Clone, Debug)]
pub struct ProcConfig {
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// Time between SIGTERM and SIGKILL when a job's scope ends.
    pub kill_grace: Duration,
    /// How long to keep reading output after the process is gone.
    pub drain_grace: Duration,
}

impl Default for ProcConfig {
    fn default() -> Self {
        Self {
            env: Vec::new(),
            cwd: None,
            kill_grace: Duration::from_millis(500),
            drain_grace: Duration::from_secs(1),
        }
    }
}

/// Job executor backed by OS processes.
///
/// The substituted command is split on whitespace and executed directly, without a shell.
pub struct ProcRunner {
    cfg: ProcConfig,
}

impl ProcRunner {
    pub fn new(cfg: ProcConfig) -> Self {
        Self { cfg }
    }
}

impl Default for ProcRunner {
    fn default() -> Self {
        Self::new(ProcConfig::default())
    }
}

/// How the wait for the child ended.
enum Exit {
    Status(ExitStatus),
    Wait(ExecError),
    Scope(Done),
}

#[async_trait]
impl Runner for ProcRunner {
    fn name(&self) -> &'static str {
        "proc"
    }

    async fn run(&self, job: &mut Job, scope: &Scope) {
        let substituted = job.substituted.clone();
        let Some((program, args)) = split_command(&substituted) else {
            fail(job, ExecError::MissingProgram);
            return;
        };

        let mut cmd = cmd_program(program, &args);
        if let Some(cwd) = &self.cfg.cwd {
            cmd.current_dir(cwd);
        }
        for (k, v) in &self.cfg.env {
            cmd.env(k, v);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        trace!(target: "concur.exec", job = %job.id, program, ?args, "spawn");
        job.advance(JobStatus::Running);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                debug!(target: "concur.exec", job = %job.id, program, error = %e, "spawn failed");
                fail(job, ExecError::Spawn(e.to_string()));
                return;
            }
        };

        let stdout = child.stdout.take().map(|s| tokio::spawn(read_all(s)));
        let stderr = child.stderr.take().map(|s| tokio::spawn(read_all(s)));

        let exit = tokio::select! {
            status = child.wait() => match status {
                Ok(status) => Exit::Status(status),
                Err(e) => Exit::Wait(ExecError::Wait(e.to_string())),
            },
            done = scope.done() => {
                debug!(target: "concur.exec", job = %job.id, ?done, "scope ended; terminating child");
                let _ = kill_graceful(&mut child, self.cfg.kill_grace).await;
                Exit::Scope(done)
            }
        };

        // Output produced before a kill is kept.
        job.stdout = split_lines(&drain(stdout, self.cfg.drain_grace).await);
        job.stderr = split_lines(&drain(stderr, self.cfg.drain_grace).await);

        match exit {
            Exit::Status(status) => match status.code() {
                Some(0) => {
                    job.return_code = 0;
                    job.advance(JobStatus::Finished);
                }
                Some(code) => {
                    debug!(target: "concur.exec", job = %job.id, code, "exit non-zero");
                    job.return_code = code;
                    job.advance(JobStatus::Errored);
                }
                None => {
                    debug!(target: "concur.exec", job = %job.id, "terminated by signal");
                    job.return_code = NO_EXIT_CODE;
                    job.advance(JobStatus::Errored);
                }
            },
            Exit::Wait(err) => fail(job, err),
            Exit::Scope(Done::DeadlineExceeded) => {
                warn!(
                    target: "concur.exec",
                    job = %job.id,
                    command = %job.substituted,
                    timeout = %fmt_duration(job.job_timeout),
                    "command timed out"
                );
                job.return_code = NO_EXIT_CODE;
                job.advance(JobStatus::TimedOut);
            }
            Exit::Scope(Done::Cancelled) => {
                job.return_code = NO_EXIT_CODE;
                job.advance(JobStatus::Errored);
            }
        }
    }
}

fn fail(job: &mut Job, err: ExecError) {
    job.stderr.push(err.to_string());
    job.return_code = NO_EXIT_CODE;
    job.advance(JobStatus::Errored);
}

async fn read_all<R>(mut reader: R) -> String
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

/// Collect a pipe reader, giving up after `grace`.
///
/// A grandchild that inherited the pipe can keep it open after the child is gone.
async fn drain(reader: Option<JoinHandle<String>>, grace: Duration) -> String {
    let Some(mut handle) = reader else {
        return String::new();
    };
    match tokio::time::timeout(grace, &mut handle).await {
        Ok(Ok(out)) => out,
        Ok(Err(_)) => String::new(),
        Err(_) => {
            handle.abort();
            String::new()
        }
    }
}

fn split_lines(s: &str) -> Vec<String> {
    s.lines().map(str::to_string).collect()
}
