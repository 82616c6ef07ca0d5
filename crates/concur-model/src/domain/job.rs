use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::duration::{UNBOUNDED, serde_human};
use crate::{JobId, JobStatus};

/// One instance of the command template bound to one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Position of the target in the input list.
    pub id: JobId,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Command template as given by the operator.
    pub template: String,
    /// Template with every token occurrence replaced by [`Job::arg`].
    pub substituted: String,
    /// Target value substituted into the template.
    pub arg: String,
    /// Captured standard output, one entry per line.
    pub stdout: Vec<String>,
    /// Captured standard error, one entry per line.
    pub stderr: Vec<String>,
    #[serde(with = "time_serde")]
    pub start_time: Option<SystemTime>,
    #[serde(with = "time_serde")]
    pub end_time: Option<SystemTime>,
    /// `end_time - start_time`, measured on a monotonic clock.
    #[serde(rename = "runtime", with = "serde_human")]
    pub run_duration: Duration,
    /// Process exit code; 0 on success.
    pub return_code: i32,
    /// Deadline applied to this job's execution scope.
    #[serde(with = "serde_human")]
    pub job_timeout: Duration,
}

impl Job {
    pub fn new(
        id: JobId,
        template: impl Into<String>,
        arg: impl Into<String>,
        substituted: impl Into<String>,
    ) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            template: template.into(),
            substituted: substituted.into(),
            arg: arg.into(),
            stdout: Vec::new(),
            stderr: Vec::new(),
            start_time: None,
            end_time: None,
            run_duration: Duration::ZERO,
            return_code: 0,
            job_timeout: UNBOUNDED,
        }
    }

    /// Move to `next` if that is a forward transition.
    ///
    /// Returns `false` (and leaves the job untouched) otherwise.
    pub fn advance(&mut self, next: JobStatus) -> bool {
        if !self.status.can_advance_to(next) {
            return false;
        }
        self.status = next;
        true
    }

    /// Terminal with a zero return code.
    pub fn is_success(&self) -> bool {
        self.status.is_terminal() && self.return_code == 0
    }
}

mod time_serde {
    use std::time::SystemTime;

    use serde::{Deserialize, Deserializer, Serializer};
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(time: &Option<SystemTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => {
                let formatted = OffsetDateTime::from(*t)
                    .format(&Rfc3339)
                    .map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SystemTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(s) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let parsed = OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom)?;
        Ok(Some(parsed.into()))
    }
}
