//! CLI argument definitions using clap
//!
//! Commands:
//! - jsondb demo
//! - jsondb write <collection> <resource> <json>
//! - jsondb read <collection> <resource>
//! - jsondb read-all <collection>
//! - jsondb delete <collection> [resource]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// jsondb - an embedded JSON document store
#[derive(Parser, Debug)]
#[command(name = "jsondb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database root directory (default "./")
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Minimum log level: trace, debug, info, warn, error, fatal (default "info")
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Optional JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Seed three sample users, list them, then delete one
    Demo,

    /// Store a JSON document
    Write {
        collection: String,
        resource: String,
        /// Document body as JSON text
        json: String,
    },

    /// Print one document
    Read { collection: String, resource: String },

    /// Print every entry of a collection
    ReadAll { collection: String },

    /// Delete a document, or the whole collection when no resource is given
    Delete {
        collection: String,
        #[arg(default_value = "")]
        resource: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
