use std::time::Duration;

use concur_model::{DurationParseError, fmt_duration};
use thiserror::Error;

/// Rejected run configuration. Always raised before any job is dispatched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "job timeout {} must not exceed global timeout {}",
        human(.job),
        human(.global)
    )]
    JobExceedsGlobal { job: Duration, global: Duration },
    #[error("invalid concurrency level: {0} (expected cpu|1x|2x|<n>)")]
    InvalidConcurrency(String),
    #[error("substitution token must not be empty")]
    EmptyToken,
    #[error("command template must not be empty")]
    EmptyTemplate,
    #[error("invalid duration: {0}")]
    Duration(#[from] DurationParseError),
}

fn human(d: &Duration) -> String {
    fmt_duration(*d)
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
