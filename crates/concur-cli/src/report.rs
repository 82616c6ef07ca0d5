use std::io::{self, Write};

use concur_model::{RunResult, StopReason};

/// Exit status after a run that produced a report.
pub const EXIT_OK: u8 = 0;
pub const EXIT_GLOBAL_TIMEOUT: u8 = 3;
pub const EXIT_INTERRUPTED: u8 = 130;

/// Pretty-printed JSON report followed by a newline.
pub fn write_json<W: Write>(out: &mut W, result: &RunResult) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, result)?;
    writeln!(out)?;
    out.flush()
}

/// One line per collected job that did not exit 0.
pub fn write_flagged<W: Write>(out: &mut W, result: &RunResult) -> io::Result<()> {
    for job in result.failed() {
        writeln!(
            out,
            "command {} exited with error code {}",
            job.substituted, job.return_code
        )?;
    }
    Ok(())
}

pub fn exit_status(result: &RunResult) -> u8 {
    match result.info.stop_reason {
        StopReason::GlobalTimeout => EXIT_GLOBAL_TIMEOUT,
        StopReason::Cancelled => EXIT_INTERRUPTED,
        StopReason::AllCompleted | StopReason::FirstSuccess | StopReason::FirstCompletion => EXIT_OK,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use concur_model::{Job, JobId, JobStatus, RunInfo, UNBOUNDED};

    use super::*;

    fn job(id: u64, arg: &str, code: i32) -> Job {
        let mut job = Job::new(JobId(id), "check {{1}}", arg, format!("check {arg}"));
        job.advance(if code == 0 { JobStatus::Finished } else { JobStatus::Errored });
        job.return_code = code;
        job
    }

    fn result(jobs: Vec<Job>, stop_reason: StopReason) -> RunResult {
        RunResult {
            info: RunInfo {
                concurrency_limit: 2,
                elapsed: Duration::from_millis(1234),
                original_command: "check {{1}}".to_string(),
                timeout: UNBOUNDED,
                dispatched: 3,
                stop_reason,
            },
            jobs,
        }
    }

    #[test]
    fn json_has_command_and_info() {
        let res = result(vec![job(0, "a", 0)], StopReason::AllCompleted);
        let mut buf = Vec::new();
        write_json(&mut buf, &res).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with("}\n"));
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["command"][0]["arg"], "a");
        assert_eq!(v["info"]["originalCommand"], "check {{1}}");
        assert_eq!(v["info"]["systemRuntime"], "1.234s");
    }

    #[test]
    fn flags_only_non_zero_codes() {
        let res = result(
            vec![job(0, "a", 0), job(1, "b", 2), job(2, "c", -1)],
            StopReason::AllCompleted,
        );
        let mut buf = Vec::new();
        write_flagged(&mut buf, &res).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "command check b exited with error code 2\ncommand check c exited with error code -1\n"
        );
    }

    #[test]
    fn exit_status_follows_stop_reason() {
        assert_eq!(exit_status(&result(vec![], StopReason::AllCompleted)), EXIT_OK);
        assert_eq!(exit_status(&result(vec![], StopReason::FirstSuccess)), EXIT_OK);
        assert_eq!(exit_status(&result(vec![], StopReason::GlobalTimeout)), EXIT_GLOBAL_TIMEOUT);
        assert_eq!(exit_status(&result(vec![], StopReason::Cancelled)), EXIT_INTERRUPTED);
    }
}
