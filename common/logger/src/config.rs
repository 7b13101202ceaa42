use crate::level::LogLevel;
use crate::LoggerError;
use chrono::{Local, NaiveDate};
use log::*;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const LOGS_DIR_NAME: &str = "logs";
pub const DEFAULT_LOGGER_NAME: &str = "main";

/// The content of a JSON logger configuration file.
/// Every field is optional; absent fields keep their default value.
///
/// Example:
/// ```json
/// { "output_filepath": "/var/log/app/app.log", "stdout": "True", "loglevel": "DEBUG" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// The file the log lines are appended to.
    #[serde(default)]
    pub output_filepath: Option<String>,

    /// Whether log lines are echoed to standard output.
    /// Only the string "True" enables the echo; any other string or boolean disables it.
    #[serde(default, deserialize_with = "deserialize_stdout_flag")]
    pub stdout: Option<bool>,

    /// The minimum level of the emitted lines.
    /// Unknown level names are read as INFO.
    #[serde(default, deserialize_with = "deserialize_level_name")]
    pub loglevel: Option<LogLevel>,
}

impl LoggerConfig {
    /// Parses the content of a configuration file.
    /// A file containing only `null` carries no overrides.
    pub fn from_json(json: &str) -> Result<LoggerConfig, serde_json::Error> {
        let config: Option<LoggerConfig> = serde_json::from_str(json)?;
        Ok(config.unwrap_or_default())
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<LoggerConfig, LoggerError> {
        let path = path.as_ref();
        debug!("Loading logger configuration from file: [{}]", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|source| LoggerError::ConfigFileError { path: path.to_path_buf(), source })?;
        LoggerConfig::from_json(&content)
            .map_err(|source| LoggerError::ConfigParseError { path: path.to_path_buf(), source })
    }
}

fn deserialize_stdout_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StdoutFlagVisitor)
}

struct StdoutFlagVisitor;

impl<'de> Visitor<'de> for StdoutFlagVisitor {
    type Value = Option<bool>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string or a boolean")
    }

    fn visit_bool<E>(self, _value: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Some(false))
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Some(value == "True"))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(None)
    }
}

fn deserialize_level_name<'de, D>(deserializer: D) -> Result<Option<LogLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let name: Option<String> = Option::deserialize(deserializer)?;
    Ok(name.map(|name| LogLevel::from_name_or_default(&name)))
}

/// The fully resolved configuration of a named logger.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerSettings {
    pub name: String,
    pub log_path: PathBuf,
    pub level: LogLevel,
    pub stdout: bool,
}

impl LoggerSettings {
    /// Merges the configuration file content over the defaults.
    /// The default log path is only computed, and its directory created, when the
    /// configuration does not provide an output file. Without a `base_dir` the default
    /// path is placed under `default_base_dir()`.
    pub fn resolve(
        name: String,
        config: Option<LoggerConfig>,
        base_dir: Option<&Path>,
    ) -> Result<LoggerSettings, LoggerError> {
        let config = config.unwrap_or_default();
        let log_path = match config.output_filepath {
            Some(path) => PathBuf::from(path),
            None => {
                let base_dir = match base_dir {
                    Some(base_dir) => base_dir.to_path_buf(),
                    None => default_base_dir()?,
                };
                create_default_log_path(&base_dir, Local::now().date_naive())?
            }
        };
        Ok(LoggerSettings {
            name,
            log_path,
            level: config.loglevel.unwrap_or_default(),
            stdout: config.stdout.unwrap_or(false),
        })
    }
}

/// Returns `<base_dir>/logs/<YYYYMMDD>.log` and creates the `logs` directory if missing.
pub fn create_default_log_path(base_dir: &Path, day: NaiveDate) -> Result<PathBuf, LoggerError> {
    let folder = base_dir.join(LOGS_DIR_NAME);
    if !folder.exists() {
        debug!("Creating log folder: [{}]", folder.display());
        std::fs::create_dir_all(&folder).map_err(|err| LoggerError::OutputError {
            path: folder.clone(),
            message: format!("Cannot create the log folder. err: {}", err),
        })?;
    }
    Ok(folder.join(format!("{}.log", day.format("%Y%m%d"))))
}

/// The directory under which the default `logs` folder is placed: the parent of the
/// directory containing the running executable.
pub fn default_base_dir() -> Result<PathBuf, LoggerError> {
    let exe = std::env::current_exe()?;
    base_dir_of(&exe).ok_or_else(|| LoggerError::LoggerConfigurationError {
        message: format!("Cannot determine the base folder of the executable [{}]", exe.display()),
    })
}

fn base_dir_of(executable: &Path) -> Option<PathBuf> {
    let exe_dir = executable.parent()?;
    Some(exe_dir.parent().unwrap_or(exe_dir).to_path_buf())
}

/// The name of the logger of the running program:
/// `<parent-folder>.<program-name-without-extension>`.
pub fn default_logger_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| logger_name_of(&exe))
        .unwrap_or_else(|| DEFAULT_LOGGER_NAME.to_owned())
}

fn logger_name_of(executable: &Path) -> Option<String> {
    let program = executable.file_stem()?.to_str()?;
    let folder = executable
        .parent()
        .and_then(|parent| parent.file_name())
        .and_then(|folder| folder.to_str())
        .unwrap_or_default();
    Some(format!("{}.{}", folder, program))
}

/// Splits a log file path into its directory and its file name.
/// A bare file name lives in the current directory.
pub fn path_to_dir_and_filename(full_path: &Path) -> Result<(PathBuf, String), LoggerError> {
    if full_path.to_string_lossy().ends_with(std::path::is_separator) {
        return Err(missing_file_name(full_path));
    }
    let filename = full_path.file_name().ok_or_else(|| missing_file_name(full_path))?;
    let filename = filename.to_str().ok_or_else(|| LoggerError::OutputError {
        path: full_path.to_path_buf(),
        message: "The output file name is not valid UTF-8".to_owned(),
    })?;
    let dir = match full_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, filename.to_owned()))
}

fn missing_file_name(full_path: &Path) -> LoggerError {
    LoggerError::OutputError {
        path: full_path.to_path_buf(),
        message: "The output file path does not contain a file name".to_owned(),
    }
}
