#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use concur_core::{Engine, RunConfig, Runner, Scope, StopPolicy, execute};
use concur_exec::{ProcConfig, ProcRunner};
use concur_model::{Job, JobId, JobStatus, NO_EXIT_CODE, StopReason, UNBOUNDED};

fn job(cmd: &str) -> Job {
    let mut job = Job::new(JobId(0), cmd, "", cmd);
    job.advance(JobStatus::Started);
    job
}

async fn run_one(cmd: &str, job_timeout: Duration) -> Job {
    let runner = ProcRunner::default();
    let root = Scope::root(UNBOUNDED);
    let scope = root.child(job_timeout);
    let mut job = job(cmd);
    execute(&runner, &mut job, &scope, job_timeout).await;
    job
}

#[test]
fn runner_is_named_proc() {
    assert_eq!(ProcRunner::default().name(), "proc");
}

#[tokio::test]
async fn captures_stdout_lines() {
    let job = run_one("echo hello world", UNBOUNDED).await;

    assert_eq!(job.status, JobStatus::Finished);
    assert_eq!(job.return_code, 0);
    assert_eq!(job.stdout, vec!["hello world".to_string()]);
    assert!(job.stderr.is_empty());
    assert!(job.start_time.is_some() && job.end_time.is_some());
}

#[tokio::test]
async fn non_zero_exit_is_errored() {
    let job = run_one("false", UNBOUNDED).await;

    assert_eq!(job.status, JobStatus::Errored);
    assert_eq!(job.return_code, 1);
}

#[tokio::test]
async fn stderr_is_captured() {
    let job = run_one("cat /nonexistent/concur-test-file", UNBOUNDED).await;

    assert_eq!(job.status, JobStatus::Errored);
    assert_ne!(job.return_code, 0);
    assert!(!job.stderr.is_empty());
}

#[tokio::test]
async fn missing_binary_fails_without_exit_code() {
    let job = run_one("concur-no-such-binary-xyz --flag", UNBOUNDED).await;

    assert_eq!(job.status, JobStatus::Errored);
    assert_eq!(job.return_code, NO_EXIT_CODE);
    assert!(job.stderr[0].starts_with("spawn failed"));
}

#[tokio::test]
async fn blank_command_has_no_program() {
    let job = run_one("   ", UNBOUNDED).await;

    assert_eq!(job.status, JobStatus::Errored);
    assert_eq!(job.return_code, NO_EXIT_CODE);
    assert_eq!(job.stderr, vec!["missing program: command is empty".to_string()]);
}

#[tokio::test]
async fn job_deadline_kills_the_process() {
    let job = run_one("sleep 5", Duration::from_millis(200)).await;

    assert_eq!(job.status, JobStatus::TimedOut);
    assert_eq!(job.return_code, NO_EXIT_CODE);
    assert_eq!(job.job_timeout, Duration::from_millis(200));
    assert!(job.run_duration < Duration::from_secs(3));
}

#[tokio::test]
async fn cancelled_root_errors_the_job() {
    let runner = ProcRunner::new(ProcConfig {
        kill_grace: Duration::from_millis(100),
        ..ProcConfig::default()
    });
    let root = Scope::root(UNBOUNDED);
    let scope = root.child(UNBOUNDED);

    let canceller = root.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let mut job = job("sleep 5");
    execute(&runner, &mut job, &scope, UNBOUNDED).await;

    assert_eq!(job.status, JobStatus::Errored);
    assert_eq!(job.return_code, NO_EXIT_CODE);
}

#[tokio::test]
async fn env_and_cwd_are_applied() {
    let runner = ProcRunner::new(ProcConfig {
        env: vec![("CONCUR_TEST_VAR".into(), "value".into())],
        cwd: Some(std::env::temp_dir()),
        ..ProcConfig::default()
    });
    let root = Scope::root(UNBOUNDED);

    let mut env_job = job("printenv CONCUR_TEST_VAR");
    execute(&runner, &mut env_job, &root.child(UNBOUNDED), UNBOUNDED).await;
    assert_eq!(env_job.stdout, vec!["value".to_string()]);

    let mut pwd_job = job("pwd");
    execute(&runner, &mut pwd_job, &root.child(UNBOUNDED), UNBOUNDED).await;
    assert_eq!(pwd_job.status, JobStatus::Finished);
    assert_eq!(pwd_job.stdout.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn global_timeout_keeps_only_finished_processes() {
    let engine = Engine::new(Arc::new(ProcRunner::default()));
    let cfg = RunConfig::default().with_timeouts(Duration::from_secs(1), Duration::ZERO);

    let out = engine.run("sleep {{1}}", &["0.1", "10"], &cfg).await.unwrap();

    assert_eq!(out.info.stop_reason, StopReason::GlobalTimeout);
    assert_eq!(out.jobs.len(), 1);
    assert_eq!(out.jobs[0].arg, "0.1");
    assert_eq!(out.info.dispatched, 2);
    assert_eq!(out.info.timeout, Duration::from_secs(1));
    assert_eq!(out.jobs[0].job_timeout, Duration::from_secs(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn any_stops_on_the_matching_target() {
    let engine = Engine::new(Arc::new(ProcRunner::default()));
    let cfg = RunConfig::default().with_stop(StopPolicy::FirstSuccess);

    let out = engine
        .run("test {{1}} -eq 3", &["1", "2", "3", "4"], &cfg)
        .await
        .unwrap();

    assert_eq!(out.info.stop_reason, StopReason::FirstSuccess);
    let winner = out.jobs.iter().find(|j| j.return_code == 0).unwrap();
    assert_eq!(winner.arg, "3");
    assert_eq!(winner.substituted, "test 3 -eq 3");
}
