use crate::LoggerError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The severity of a log line.
/// Levels are ordered by their numeric severity: DEBUG < INFO < WARNING < ERROR < CRITICAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

pub const ALL_LEVELS: [LogLevel; 5] =
    [LogLevel::Debug, LogLevel::Info, LogLevel::Warning, LogLevel::Error, LogLevel::Critical];

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl LogLevel {
    /// The numeric severity of the level.
    pub fn severity(self) -> u8 {
        self as u8
    }

    pub fn from_severity(severity: u8) -> Option<LogLevel> {
        ALL_LEVELS.iter().copied().find(|level| level.severity() == severity)
    }

    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// Parses a level name and falls back to INFO when the name is not one of
    /// DEBUG, INFO, WARNING, ERROR or CRITICAL.
    pub fn from_name_or_default(name: &str) -> LogLevel {
        name.parse().unwrap_or_default()
    }

    /// The `tracing` level used to emit a line of this severity.
    /// `tracing` has no level above ERROR, so CRITICAL lines are emitted as ERROR.
    pub fn tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error | LogLevel::Critical => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        ALL_LEVELS
            .iter()
            .copied()
            .find(|level| level.name() == name)
            .ok_or_else(|| LoggerError::UnknownLevel { level: name.to_owned() })
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for LogLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warning,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug | log::Level::Trace => LogLevel::Debug,
        }
    }
}
