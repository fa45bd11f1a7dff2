//! CLI module for jsondb
//!
//! Provides a command-line front end over a single [`Driver`](crate::Driver):
//! - demo: seed sample users, list them, delete one
//! - write / read / read-all / delete: one storage operation each

mod args;
mod commands;
mod demo;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{delete, demo, execute, read, read_all, run, run_command, write, Config};
pub use demo::{sample_users, Address, User, DEMO_COLLECTION};
pub use errors::{CliError, CliResult};
pub use io::{error_envelope, ok_envelope, write_envelope, write_error, write_response};
