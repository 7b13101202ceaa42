//! A leveled logging facility writing to a log file and, optionally, to standard output.
//!
//! ```no_run
//! use log_manager::LogManager;
//!
//! let logger = LogManager::from_config_file("/etc/my_app/logger.json")?;
//! logger.info("started");
//! logger.warning(format_args!("{} retries left", 3));
//! # Ok::<(), log_manager::LoggerError>(())
//! ```
//!
//! Every line reads `LEVEL [timestamp] FILE LINE MESSAGE`, FILE and LINE being the location
//! of the logging call.

use std::path::PathBuf;
use thiserror::Error;

pub mod config;
pub mod format;
pub mod level;
pub mod manager;
pub mod registry;

pub use config::{LoggerConfig, LoggerSettings};
pub use level::LogLevel;
pub use manager::{LogManager, LogManagerBuilder};
pub use registry::{LoggerRegistry, NamedLogger};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("ConfigFileError: Cannot read the logger configuration file [{}]. err: {source}", .path.display())]
    ConfigFileError { path: PathBuf, source: std::io::Error },

    #[error("ConfigParseError: Cannot parse the logger configuration file [{}]. err: {source}", .path.display())]
    ConfigParseError { path: PathBuf, source: serde_json::Error },

    #[error("OutputError: [{}]: {message}", .path.display())]
    OutputError { path: PathBuf, message: String },

    #[error("UnknownLevel: [{level}] is not one of DEBUG, INFO, WARNING, ERROR, CRITICAL")]
    UnknownLevel { level: String },

    #[error("LoggerConfigurationError: [{message}]")]
    LoggerConfigurationError { message: String },
}

impl From<log::SetLoggerError> for LoggerError {
    fn from(error: log::SetLoggerError) -> Self {
        LoggerError::LoggerConfigurationError { message: format!("{}", error) }
    }
}

impl From<std::io::Error> for LoggerError {
    fn from(error: std::io::Error) -> Self {
        LoggerError::LoggerConfigurationError { message: format!("{}", error) }
    }
}
