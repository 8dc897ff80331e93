#![forbid(unsafe_code)]

pub mod cli;
pub mod error;
pub mod session;

pub use cli::run_from_env;
pub use error::{PodctlError, Result};
