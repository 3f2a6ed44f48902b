//! Tracing subscriber setup driven by the environment.
//!
//! - `REOPT_TRACE`: filter directive (`debug`, `reopt_core=trace,info`, ...).
//!   Unset means `off`.
//! - `REOPT_LOG_FORMAT`: `pretty` (default) or `json`.
//! - `REOPT_LOG_FILE`: optional path; events are also appended there.

use std::env;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const TRACE_ENV: &str = "REOPT_TRACE";
pub const FORMAT_ENV: &str = "REOPT_LOG_FORMAT";
pub const FILE_ENV: &str = "REOPT_LOG_FILE";

/// Errors raised while installing the subscriber.
#[derive(Debug)]
pub enum LoggingError {
    InvalidFilter(String),
    InvalidFormat(String),
    LogFile { path: PathBuf, source: io::Error },
    Init(String),
}

impl LoggingError {
    pub fn code(&self) -> &'static str {
        match self {
            LoggingError::InvalidFilter(_) => "LOGGING_INVALID_FILTER",
            LoggingError::InvalidFormat(_) => "LOGGING_INVALID_FORMAT",
            LoggingError::LogFile { .. } => "LOGGING_FILE",
            LoggingError::Init(_) => "LOGGING_INIT",
        }
    }
}

impl std::fmt::Display for LoggingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoggingError::InvalidFilter(msg) => {
                write!(f, "[{}] Invalid log filter: {}", self.code(), msg)
            }
            LoggingError::InvalidFormat(value) => write!(
                f,
                "[{}] Invalid {} '{}' (expected 'json' or 'pretty')",
                self.code(),
                FORMAT_ENV,
                value
            ),
            LoggingError::LogFile { path, source } => write!(
                f,
                "[{}] Failed to open log file {}: {}",
                self.code(),
                path.display(),
                source
            ),
            LoggingError::Init(msg) => {
                write!(f, "[{}] Failed to initialize logging: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for LoggingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggingError::LogFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Result<Self, LoggingError> {
        if value.eq_ignore_ascii_case("pretty") {
            Ok(LogFormat::Pretty)
        } else if value.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(LoggingError::InvalidFormat(value.to_string()))
        }
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "off".to_string(),
            format: LogFormat::Pretty,
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Read settings from `REOPT_*` variables, falling back to defaults.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_values(
            env::var(TRACE_ENV).ok(),
            env::var(FORMAT_ENV).ok(),
            env::var(FILE_ENV).ok(),
        )
    }

    fn from_values(
        level: Option<String>,
        format: Option<String>,
        file: Option<String>,
    ) -> Result<Self, LoggingError> {
        let format = match format {
            Some(value) => LogFormat::parse(&value)?,
            None => LogFormat::Pretty,
        };
        Ok(Self {
            level: level.unwrap_or_else(|| "off".to_string()),
            format,
            file: file.filter(|path| !path.is_empty()).map(PathBuf::from),
        })
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    fn filter(&self) -> Result<EnvFilter, LoggingError> {
        if self.level.eq_ignore_ascii_case("off") {
            Ok(EnvFilter::default().add_directive(LevelFilter::OFF.into()))
        } else {
            EnvFilter::try_new(&self.level).map_err(|err| LoggingError::InvalidFilter(err.to_string()))
        }
    }

    /// Install a global subscriber for these settings.
    ///
    /// Returns `Ok(false)` when a subscriber is already installed.
    pub fn install(&self) -> Result<bool, LoggingError> {
        if tracing::dispatcher::has_been_set() {
            return Ok(false);
        }
        let filter = self.filter()?;
        let file = self.file.as_deref().map(open_log_file).transpose()?;
        let init_err = |err: tracing_subscriber::util::TryInitError| LoggingError::Init(err.to_string());

        match self.format {
            LogFormat::Json => {
                let stderr_layer = tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .json();
                let file_layer = file.map(|file| {
                    tracing_subscriber::fmt::layer()
                        .with_writer(file)
                        .with_ansi(false)
                        .json()
                });
                tracing_subscriber::registry()
                    .with(filter)
                    .with(stderr_layer)
                    .with(file_layer)
                    .try_init()
                    .map_err(init_err)?;
            }
            LogFormat::Pretty => {
                let stderr_layer = tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .pretty();
                let file_layer = file.map(|file| {
                    tracing_subscriber::fmt::layer()
                        .with_writer(file)
                        .with_ansi(false)
                        .pretty()
                });
                tracing_subscriber::registry()
                    .with(filter)
                    .with(stderr_layer)
                    .with(file_layer)
                    .try_init()
                    .map_err(init_err)?;
            }
        }
        Ok(true)
    }
}

fn open_log_file(path: &std::path::Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Install the subscriber described by the `REOPT_*` environment variables.
///
/// Returns `Ok(true)` when installed, `Ok(false)` if a subscriber already exists.
pub fn init_logging() -> Result<bool, LoggingError> {
    LoggingConfig::from_env()?.install()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_off_and_pretty() {
        let config = LoggingConfig::from_values(None, None, None).unwrap();
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.level, "off");
    }

    #[test]
    fn values_are_parsed() {
        let config = LoggingConfig::from_values(
            Some("reopt_core=debug".to_string()),
            Some("JSON".to_string()),
            Some("/tmp/reopt.log".to_string()),
        )
        .unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/reopt.log")));
        assert!(config.filter().is_ok());
    }

    #[test]
    fn empty_file_means_no_file() {
        let config = LoggingConfig::from_values(None, None, Some(String::new())).unwrap();
        assert!(config.file.is_none());
    }

    #[test]
    fn bad_format_is_rejected() {
        let err = LoggingConfig::from_values(None, Some("xml".to_string()), None).unwrap_err();
        assert_eq!(err.code(), "LOGGING_INVALID_FORMAT");
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn bad_filter_is_rejected() {
        let config = LoggingConfig::default().with_level("reopt_core=notalevel");
        assert_eq!(config.filter().unwrap_err().code(), "LOGGING_INVALID_FILTER");
    }
}
