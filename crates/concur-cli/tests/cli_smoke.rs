#![cfg(unix)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

fn concur(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_concur"))
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("run concur")
}

fn report(out: &Output) -> Value {
    serde_json::from_slice(&out.stdout).expect("stdout is a JSON report")
}

#[test]
fn echoes_every_target() {
    let out = concur(&["echo {{1}}", "a", "b", "c"]);
    assert!(out.status.success());

    let v = report(&out);
    let jobs = v["command"].as_array().unwrap();
    assert_eq!(jobs.len(), 3);
    for job in jobs {
        assert_eq!(job["status"], "Finished");
        assert_eq!(job["stdout"][0], job["arg"]);
    }
    assert_eq!(v["info"]["originalCommand"], "echo {{1}}");
    assert_eq!(v["info"]["dispatched"], 3);
}

#[test]
fn flag_errors_lists_failures_on_stderr() {
    let out = concur(&["-e", "-T", "@", "test @ -eq 1", "1", "2"]);
    assert!(out.status.success());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("command test 2 -eq 1 exited with error code 1"));
    assert!(!stderr.contains("command test 1 -eq 1"));
}

#[test]
fn global_timeout_exits_with_partial_status() {
    let out = concur(&["-t", "500ms", "sleep {{1}}", "0", "5"]);
    assert_eq!(out.status.code(), Some(3));

    let v = report(&out);
    assert_eq!(v["command"].as_array().unwrap().len(), 1);
    assert_eq!(v["info"]["stopReason"], "globalTimeout");
}

#[test]
fn job_timeout_above_global_is_rejected() {
    let out = concur(&["-t", "1s", "-j", "2s", "true {{1}}", "x"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("must not exceed"));
}

#[test]
fn targets_from_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_concur"))
        .args(["-c", "1", "echo {{1}}"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn concur");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"x y\nz\n")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());

    let v = report(&out);
    assert_eq!(v["command"].as_array().unwrap().len(), 3);
    assert_eq!(v["info"]["concurrencyLimit"], 1);
}
