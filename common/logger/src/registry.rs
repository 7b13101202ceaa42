use crate::config::{path_to_dir_and_filename, LoggerSettings};
use crate::format::LineFormatter;
use crate::level::LogLevel;
use crate::LoggerError;
use lazy_static::lazy_static;
use log::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::Dispatch;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, reload, Layer, Registry};

/// The output handlers of a named logger: the file handler and, optionally, the console handler.
pub type Handlers = Box<dyn Layer<Registry> + Send + Sync>;

lazy_static! {
    static ref GLOBAL_REGISTRY: LoggerRegistry = LoggerRegistry::new();
}

/// A set of loggers identified by name.
///
/// Configuring a name that is already registered reuses the existing logger:
/// its handlers, level threshold and settings are replaced,
/// so every `LogManager` bound to that name sees the new configuration.
#[derive(Default)]
pub struct LoggerRegistry {
    loggers: Mutex<HashMap<String, Arc<NamedLogger>>>,
}

impl LoggerRegistry {
    pub fn new() -> LoggerRegistry {
        Default::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static LoggerRegistry {
        &GLOBAL_REGISTRY
    }

    /// Creates the logger `settings.name` or reconfigures it if it already exists.
    /// The handlers are built before the registry is touched; if the log file cannot be
    /// opened, an existing logger keeps its previous handlers.
    pub fn configure(
        &self,
        settings: &LoggerSettings,
        console: Option<BoxMakeWriter>,
    ) -> Result<Arc<NamedLogger>, LoggerError> {
        let handlers = build_handlers(&settings.log_path, console)?;

        let mut loggers = self.loggers();
        if let Some(logger) = loggers.get(&settings.name) {
            debug!("Reconfiguring logger [{}]", settings.name);
            logger.replace_handlers(handlers)?;
            logger.set_level(settings.level);
            logger.replace_settings(settings.clone());
            return Ok(logger.clone());
        }

        debug!("Creating logger [{}]", settings.name);
        let logger = Arc::new(NamedLogger::new(settings.clone(), handlers));
        loggers.insert(settings.name.clone(), logger.clone());
        Ok(logger)
    }

    pub fn get(&self, name: &str) -> Option<Arc<NamedLogger>> {
        self.loggers().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers().contains_key(name)
    }

    /// The names of the registered loggers, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.loggers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers().is_empty()
    }

    /// Removes a logger from the registry.
    /// Its log file is closed when the last `LogManager` using it is dropped.
    pub fn remove(&self, name: &str) -> Option<Arc<NamedLogger>> {
        self.loggers().remove(name)
    }

    pub fn clear(&self) {
        self.loggers().clear()
    }

    // The map is only ever modified by single insert/remove calls, so a poisoned lock
    // still guards a consistent map.
    fn loggers(&self) -> MutexGuard<'_, HashMap<String, Arc<NamedLogger>>> {
        self.loggers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A logger with its own handlers and level threshold.
pub struct NamedLogger {
    name: String,
    dispatch: Dispatch,
    handlers: reload::Handle<Handlers, Registry>,
    threshold: AtomicU8,
    settings: RwLock<LoggerSettings>,
}

impl NamedLogger {
    fn new(settings: LoggerSettings, handlers: Handlers) -> NamedLogger {
        let (reloadable_handlers, handlers_handle) = reload::Layer::new(handlers);
        let dispatch = Dispatch::new(tracing_subscriber::registry().with(reloadable_handlers));
        NamedLogger {
            name: settings.name.clone(),
            dispatch,
            handlers: handlers_handle,
            threshold: AtomicU8::new(settings.level.severity()),
            settings: RwLock::new(settings),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The settings of the latest successful configuration.
    pub fn settings(&self) -> LoggerSettings {
        self.settings.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn log_path(&self) -> PathBuf {
        self.settings.read().unwrap_or_else(PoisonError::into_inner).log_path.clone()
    }

    pub fn stdout_enabled(&self) -> bool {
        self.settings.read().unwrap_or_else(PoisonError::into_inner).stdout
    }

    /// The current level threshold.
    pub fn level(&self) -> LogLevel {
        LogLevel::from_severity(self.threshold.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.threshold.store(level.severity(), Ordering::Relaxed);
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level.severity() >= self.threshold.load(Ordering::Relaxed)
    }

    /// Writes the message to every handler, if the level passes the threshold.
    pub fn emit(&self, level: LogLevel, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        let level_name = level.name();
        tracing::dispatcher::with_default(&self.dispatch, || match level {
            LogLevel::Debug => tracing::debug!(level_name, "{}", message),
            LogLevel::Info => tracing::info!(level_name, "{}", message),
            LogLevel::Warning => tracing::warn!(level_name, "{}", message),
            LogLevel::Error | LogLevel::Critical => tracing::error!(level_name, "{}", message),
        });
    }

    fn replace_settings(&self, settings: LoggerSettings) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    // The previous handlers are dropped by the reload, which closes their files.
    fn replace_handlers(&self, handlers: Handlers) -> Result<(), LoggerError> {
        self.handlers.reload(handlers).map_err(|err| LoggerError::LoggerConfigurationError {
            message: format!("Cannot reload the handlers of logger [{}]. err: {:?}", self.name, err),
        })
    }
}

/// Builds the file handler and, when a console writer is given, the console handler.
/// Both share the same line format.
pub fn build_handlers(
    log_path: &Path,
    console: Option<BoxMakeWriter>,
) -> Result<Handlers, LoggerError> {
    let (dir, filename) = path_to_dir_and_filename(log_path)?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(filename)
        .build(&dir)
        .map_err(|err| LoggerError::OutputError {
            path: log_path.to_path_buf(),
            message: format!("Cannot open the log file. err: {}", err),
        })?;

    let file_handler = fmt::Layer::<Registry>::new()
        .with_ansi(false)
        .event_format(LineFormatter::new())
        .with_writer(file_appender);

    let console_handler = console.map(|writer| {
        fmt::Layer::<Registry>::new()
            .with_ansi(false)
            .event_format(LineFormatter::new())
            .with_writer(writer)
    });

    Ok(Box::new(file_handler.and_then(console_handler)))
}
