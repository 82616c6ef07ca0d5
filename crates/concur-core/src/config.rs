use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::timeouts::{self, Timeouts};

/// Default placeholder replaced by each target.
pub const DEFAULT_TOKEN: &str = "{{1}}";

/// Worker budget of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// One slot per job.
    #[default]
    Unbounded,
    /// One slot per available CPU.
    Cpu,
    /// Two slots per available CPU.
    DoubleCpu,
    Fixed(NonZeroUsize),
}

impl Concurrency {
    /// Resolve to a slot count for a run of `jobs` jobs.
    pub fn limit(&self, jobs: usize) -> usize {
        match self {
            Concurrency::Unbounded => jobs,
            Concurrency::Cpu => cpus(),
            Concurrency::DoubleCpu => cpus() * 2,
            Concurrency::Fixed(n) => n.get(),
        }
    }
}

fn cpus() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

impl FromStr for Concurrency {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        match norm.as_str() {
            "" | "0" => Ok(Concurrency::Unbounded),
            "cpu" | "1x" => Ok(Concurrency::Cpu),
            "2x" => Ok(Concurrency::DoubleCpu),
            n => n
                .parse::<NonZeroUsize>()
                .map(Concurrency::Fixed)
                .map_err(|_| ConfigError::InvalidConcurrency(s.to_string())),
        }
    }
}

/// Early-termination policy of the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopPolicy {
    /// Collect every job.
    #[default]
    All,
    /// Stop at the first job that returns 0.
    FirstSuccess,
    /// Stop at the first job that completes, whatever its outcome.
    FirstCompletion,
}

impl StopPolicy {
    /// Combine the `any` and `first` switches. `first` wins when both are set.
    pub fn from_flags(any: bool, first: bool) -> Self {
        match (any, first) {
            (_, true) => StopPolicy::FirstCompletion,
            (true, false) => StopPolicy::FirstSuccess,
            (false, false) => StopPolicy::All,
        }
    }
}

/// Immutable per-run policy.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub concurrency: Concurrency,
    /// Run-level timeout as given; zero means unset.
    pub timeout: Duration,
    /// Per-job timeout as given; zero means unset.
    pub job_timeout: Duration,
    /// Literal placeholder replaced by each target.
    pub token: String,
    pub stop: StopPolicy,
    /// Report jobs with a non-zero return code once the run is over.
    pub flag_errors: bool,
    /// How long cancelled execution units may take to wind down before they are aborted.
    pub shutdown_grace: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: Concurrency::Unbounded,
            timeout: Duration::ZERO,
            job_timeout: Duration::ZERO,
            token: DEFAULT_TOKEN.to_string(),
            stop: StopPolicy::All,
            flag_errors: false,
            shutdown_grace: Duration::from_secs(2),
        }
    }
}

impl RunConfig {
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeouts(mut self, global: Duration, job: Duration) -> Self {
        self.timeout = global;
        self.job_timeout = job;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_stop(mut self, stop: StopPolicy) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_flag_errors(mut self, flag_errors: bool) -> Self {
        self.flag_errors = flag_errors;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Check the configuration and resolve its timeouts.
    pub fn validate(&self) -> Result<Timeouts, ConfigError> {
        if self.token.is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        timeouts::resolve(self.timeout, self.job_timeout)
    }
}
