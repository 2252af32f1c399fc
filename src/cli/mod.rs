//! CLI module for stashdb
//!
//! Provides read-only inspection of store files:
//! - inspect: Print the envelope header of one file
//! - list: List every store file in the configured base directory

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{inspect, list, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
