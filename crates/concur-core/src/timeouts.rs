//! Reconciliation of the run-level and job-level deadlines.
use std::time::Duration;

use concur_model::UNBOUNDED;
use tracing::debug;

use crate::error::ConfigError;

/// Resolved deadlines; neither is ever zero-as-unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub global: Duration,
    pub job: Duration,
}

/// Resolve `(global, job)` where zero means "not set".
///
/// - job set, global unset: global is unbounded
/// - global set, job unset: job inherits global
/// - neither set: both unbounded
/// - both set: job must not exceed global
pub fn resolve(global: Duration, job: Duration) -> Result<Timeouts, ConfigError> {
    let resolved = match (global.is_zero(), job.is_zero()) {
        (true, false) => Timeouts {
            global: UNBOUNDED,
            job,
        },
        (false, true) => Timeouts {
            global,
            job: global,
        },
        (true, true) => Timeouts {
            global: UNBOUNDED,
            job: UNBOUNDED,
        },
        (false, false) => {
            if job > global {
                return Err(ConfigError::JobExceedsGlobal { job, global });
            }
            Timeouts { global, job }
        }
    };
    debug!(target: "concur.core.timeouts", global = ?resolved.global, job = ?resolved.job, "timeouts resolved");
    Ok(resolved)
}
