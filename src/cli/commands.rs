//! CLI command implementations
//!
//! Each command opens one [`Driver`] against the configured root, performs a
//! single storage operation (or the demo sequence) and returns the JSON value
//! printed in the `data` field of the response.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::observability::{ConsoleLogger, Severity};
use crate::storage::{Driver, Options};

use super::args::{Cli, Command};
use super::demo::{sample_users, User, DEMO_COLLECTION};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Optional configuration file. Command-line flags override every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Database root directory (default "./")
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Minimum log level (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> String {
    "./".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Builds the effective configuration: defaults, then file, then flags
    pub fn resolve(cli: &Cli) -> CliResult<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(dir) = &cli.dir {
            config.data_dir = dir.display().to_string();
        }
        if let Some(level) = &cli.log_level {
            config.log_level = level.clone();
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }
        self.log_level
            .parse::<Severity>()
            .map_err(CliError::config_error)?;
        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Parsed log level; `validate` has already rejected bad values
    pub fn severity(&self) -> Severity {
        self.log_level.parse().unwrap_or(Severity::Info)
    }

    /// Opens a driver with a console logger at the configured level
    pub fn open_driver(&self) -> CliResult<Driver> {
        let logger = Arc::new(ConsoleLogger::new(self.severity()));
        Ok(Driver::new(self.data_path(), Options::with_logger(logger))?)
    }
}

/// Main CLI entry point
///
/// Parses arguments, runs the command and prints one response envelope.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match execute(&cli) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), &e.message())?;
            Err(e)
        }
    }
}

/// Resolves configuration, opens the driver and runs the command
pub fn execute(cli: &Cli) -> CliResult<Value> {
    let config = Config::resolve(cli)?;
    let driver = config.open_driver()?;
    run_command(&driver, &cli.command)
}

/// Run the appropriate command against an open driver
pub fn run_command(driver: &Driver, cmd: &Command) -> CliResult<Value> {
    match cmd {
        Command::Demo => demo(driver),
        Command::Write {
            collection,
            resource,
            json,
        } => write(driver, collection, resource, json),
        Command::Read {
            collection,
            resource,
        } => read(driver, collection, resource),
        Command::ReadAll { collection } => read_all(driver, collection),
        Command::Delete {
            collection,
            resource,
        } => delete(driver, collection, resource),
    }
}

pub fn write(
    driver: &Driver,
    collection: &str,
    resource: &str,
    json_text: &str,
) -> CliResult<Value> {
    let value: Value = serde_json::from_str(json_text).map_err(CliError::Input)?;
    driver.write(collection, resource, &value)?;
    Ok(json!({
        "collection": collection,
        "resource": resource,
        "written": true
    }))
}

pub fn read(driver: &Driver, collection: &str, resource: &str) -> CliResult<Value> {
    Ok(driver.read::<Value>(collection, resource)?)
}

pub fn read_all(driver: &Driver, collection: &str) -> CliResult<Value> {
    let records = driver.read_all(collection)?;
    Ok(json!(records))
}

pub fn delete(driver: &Driver, collection: &str, resource: &str) -> CliResult<Value> {
    driver.delete(collection, resource)?;
    Ok(json!({
        "collection": collection,
        "resource": resource,
        "deleted": true
    }))
}

/// Seeds John, Alex and Max into `users`, reads them back, deletes John.
pub fn demo(driver: &Driver) -> CliResult<Value> {
    for user in sample_users() {
        driver.write(DEMO_COLLECTION, &user.name, &user)?;
    }

    let records = driver.read_all(DEMO_COLLECTION)?;
    let users = records
        .iter()
        .map(|raw| serde_json::from_str::<User>(raw))
        .collect::<Result<Vec<_>, _>>()?;

    driver.delete(DEMO_COLLECTION, "John")?;
    let remaining = driver.read_all(DEMO_COLLECTION)?.len();

    Ok(json!({
        "records": records,
        "users": users,
        "deleted": "John",
        "remaining": remaining
    }))
}
