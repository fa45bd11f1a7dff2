//! jsondb CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`, which prints the JSON
//! response. Exits non-zero on failure.

use jsondb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
