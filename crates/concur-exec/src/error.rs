use thiserror::Error;

/// Failure to run a job's process. Recorded in the job's stderr, never returned.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("missing program: command is empty")]
    MissingProgram,
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("wait failed: {0}")]
    Wait(String),
}
