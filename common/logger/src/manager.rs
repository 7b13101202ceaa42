use crate::config::{default_logger_name, LoggerConfig, LoggerSettings};
use crate::level::LogLevel;
use crate::registry::{LoggerRegistry, NamedLogger};
use crate::LoggerError;
use log::debug;
use std::fmt::Display;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;

/// A handle to a configured, named logger.
///
/// Every line is written as `LEVEL [timestamp] FILE LINE MESSAGE`, where FILE and LINE
/// are the source location of the call to `debug`, `info`, `warning`, `error` or `critical`.
///
/// Handles are cheap to clone; clones share the same logger.
/// Every accessor reflects the latest configuration of the logger name,
/// including a reconfiguration done through another handle.
#[derive(Clone)]
pub struct LogManager {
    logger: Arc<NamedLogger>,
}

impl LogManager {
    /// Configures the logger of the running program with the default settings:
    /// INFO level, no console output, file `<base>/logs/<YYYYMMDD>.log`.
    pub fn new() -> Result<LogManager, LoggerError> {
        LogManager::builder().build()
    }

    /// Configures the logger of the running program from a JSON configuration file.
    /// An empty path is the same as no configuration file.
    pub fn from_config_file<P: AsRef<Path>>(config_path: P) -> Result<LogManager, LoggerError> {
        LogManager::builder().config_path(config_path).build()
    }

    pub fn builder<'a>() -> LogManagerBuilder<'a> {
        LogManagerBuilder::default()
    }

    pub fn name(&self) -> &str {
        self.logger.name()
    }

    pub fn log_path(&self) -> PathBuf {
        self.logger.log_path()
    }

    pub fn stdout_enabled(&self) -> bool {
        self.logger.stdout_enabled()
    }

    /// The resolved settings of the current configuration.
    pub fn settings(&self) -> LoggerSettings {
        self.logger.settings()
    }

    pub fn level(&self) -> LogLevel {
        self.logger.level()
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.logger.is_enabled(level)
    }

    #[track_caller]
    pub fn debug<M: Display>(&self, message: M) {
        self.write(LogLevel::Debug, Location::caller(), message)
    }

    #[track_caller]
    pub fn info<M: Display>(&self, message: M) {
        self.write(LogLevel::Info, Location::caller(), message)
    }

    #[track_caller]
    pub fn warning<M: Display>(&self, message: M) {
        self.write(LogLevel::Warning, Location::caller(), message)
    }

    #[track_caller]
    pub fn error<M: Display>(&self, message: M) {
        self.write(LogLevel::Error, Location::caller(), message)
    }

    #[track_caller]
    pub fn critical<M: Display>(&self, message: M) {
        self.write(LogLevel::Critical, Location::caller(), message)
    }

    /// Logs a message at the given level.
    #[track_caller]
    pub fn log<M: Display>(&self, level: LogLevel, message: M) {
        self.write(level, Location::caller(), message)
    }

    /// Registers a clone of this handle as the logger of the `log` crate macros.
    /// Fails if a `log` logger was already set in this process.
    pub fn install(&self) -> Result<(), LoggerError> {
        log::set_boxed_logger(Box::new(self.clone()))?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(())
    }

    fn write<M: Display>(&self, level: LogLevel, caller: &Location<'_>, message: M) {
        self.write_at(level, caller.file(), caller.line(), message)
    }

    fn write_at<M: Display>(&self, level: LogLevel, file: &str, line: u32, message: M) {
        if self.logger.is_enabled(level) {
            self.logger.emit(level, &format!("{} {} {}", file, line, message));
        }
    }
}

impl log::Log for LogManager {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.is_enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let file = record.file().or_else(|| record.module_path()).unwrap_or("<unknown>");
        self.write_at(record.level().into(), file, record.line().unwrap_or(0), record.args());
    }

    fn flush(&self) {}
}

/// Builds a `LogManager`.
///
/// By default the logger is registered in the process-wide registry, named after the
/// running executable and without a configuration file.
#[derive(Default)]
pub struct LogManagerBuilder<'a> {
    registry: Option<&'a LoggerRegistry>,
    name: Option<String>,
    config_path: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    console: Option<BoxMakeWriter>,
}

impl<'a> LogManagerBuilder<'a> {
    pub fn registry(mut self, registry: &'a LoggerRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn config_path<P: AsRef<Path>>(mut self, config_path: P) -> Self {
        let config_path = config_path.as_ref();
        self.config_path =
            if config_path.as_os_str().is_empty() { None } else { Some(config_path.to_path_buf()) };
        self
    }

    /// The folder containing the default `logs` folder.
    pub fn base_dir<P: Into<PathBuf>>(mut self, base_dir: P) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Replaces standard output as the destination of the console echo.
    /// The writer is used only if the console echo is enabled.
    pub fn console_writer<W>(mut self, writer: W) -> Self
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        self.console = Some(BoxMakeWriter::new(writer));
        self
    }

    pub fn build(self) -> Result<LogManager, LoggerError> {
        let config = match &self.config_path {
            Some(path) => Some(LoggerConfig::from_file(path)?),
            None => None,
        };

        let name = self.name.unwrap_or_else(default_logger_name);
        let settings = LoggerSettings::resolve(name, config, self.base_dir.as_deref())?;

        let console = if settings.stdout {
            Some(self.console.unwrap_or_else(|| BoxMakeWriter::new(std::io::stdout)))
        } else {
            None
        };

        let registry = self.registry.unwrap_or_else(|| LoggerRegistry::global());
        let logger = registry.configure(&settings, console)?;

        debug!(
            "Logger [{}] configured. file: [{}], level: [{}], stdout: [{}]",
            settings.name,
            settings.log_path.display(),
            settings.level,
            settings.stdout
        );

        Ok(LogManager { logger })
    }
}
