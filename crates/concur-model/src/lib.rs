//! Data model shared by the concur engine, executor and reporting layers.
//!
//! Everything here is plain data: a [`Job`] is created by the builder, mutated
//! by exactly one executor and then handed to the collector, which assembles a
//! [`RunResult`].

pub mod duration;
pub use duration::{DurationParseError, UNBOUNDED, fmt_duration, parse_duration};

mod domain;
pub use domain::*;
