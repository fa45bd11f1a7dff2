//! jsondb - an embedded document store
//!
//! Persists structured records as individual JSON files under a directory
//! tree, organized into named collections. Single-process, no server.
//!
//! ```no_run
//! use jsondb::{Driver, Options};
//! use serde_json::json;
//!
//! let db = Driver::new("./db", Options::default())?;
//! db.write("users", "john", &json!({"name": "John"}))?;
//! let john: serde_json::Value = db.read("users", "john")?;
//! let everyone = db.read_all("users")?;
//! db.delete("users", "john")?;
//! # Ok::<(), jsondb::StorageError>(())
//! ```

pub mod cli;
pub mod crash_point;
pub mod observability;
pub mod storage;

pub use observability::{ConsoleLogger, Logger, Severity};
pub use storage::{Driver, Options, StorageError, StorageErrorCode, StorageResult};

/// Version of the on-disk driver
pub const VERSION: &str = "1.0.1";
