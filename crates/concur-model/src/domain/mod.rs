mod job_id;
pub use job_id::JobId;

mod job_status;
pub use job_status::JobStatus;

mod job;
pub use job::Job;

mod run_result;
pub use run_result::{RunInfo, RunResult, StopReason};

/// Return code recorded when a process produced no exit code of its own
/// (spawn failure, killed by a signal, timed out).
pub const NO_EXIT_CODE: i32 = -1;
