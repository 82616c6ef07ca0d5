//! Concurrent dispatch-and-collection engine.
//!
//! A run turns one command template and a list of targets into jobs, executes them
//! under a fixed admission budget and collects their outcomes until the stop policy,
//! the run-level deadline or plain exhaustion ends it.
//!
//! Cancellation is two-level: one root [`Scope`] per run and one child scope per job.
//! Cancelling the root reaches every job still in flight.

pub mod builder;
pub use builder::build_jobs;

pub mod collect;
pub use collect::{Collected, Collector};

pub mod config;
pub use config::{Concurrency, RunConfig, StopPolicy};

pub mod dispatch;
pub use dispatch::{Dispatch, Dispatcher};

mod engine;
pub use engine::Engine;

mod error;
pub use error::{ConfigError, CoreError};

pub mod progress;
pub use progress::{NoProgress, Progress};

pub mod runner;
pub use runner::{Runner, execute};

pub mod scope;
pub use scope::{Done, Scope};

pub mod timeouts;
pub use timeouts::Timeouts;
