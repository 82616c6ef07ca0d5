mod error;
pub use error::ExecError;

pub mod proc;
pub use proc::{ProcConfig, ProcRunner};

mod util;
pub use util::split_command;
