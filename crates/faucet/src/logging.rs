use crate::error::{FaucetError, FaucetResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to write logs to file
    #[serde(default = "default_file_logging")]
    pub file_logging: bool,

    /// Log file directory
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Log file name prefix
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Log format (json, pretty, compact)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to include target/module
    #[serde(default = "default_include_target")]
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_logging: default_file_logging(),
            log_dir: default_log_dir(),
            log_file: default_log_file(),
            format: default_log_format(),
            include_target: default_include_target(),
        }
    }
}

// Default values
fn default_log_level() -> String { "info".to_string() }
fn default_file_logging() -> bool { false }
fn default_log_dir() -> PathBuf { PathBuf::from("logs") }
fn default_log_file() -> String { "faucet.log".to_string() }
fn default_log_format() -> String { "pretty".to_string() }
fn default_include_target() -> bool { true }

/// Log format types
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl From<&str> for LogFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Initialize logging system.
///
/// The returned guard flushes the file writer on drop and must live as long as the process.
pub fn init_logging(config: &LoggingConfig) -> FaucetResult<Option<WorkerGuard>> {
    let env_filter = build_env_filter(config)?;

    let format = LogFormat::from(config.format.as_str());
    let json = (format == LogFormat::Json)
        .then(|| fmt::layer().json().with_target(config.include_target));
    let compact = (format == LogFormat::Compact)
        .then(|| fmt::layer().compact().with_target(config.include_target));
    let pretty = (format == LogFormat::Pretty)
        .then(|| fmt::layer().pretty().with_target(config.include_target));

    let (file, guard) = if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)
            .map_err(|e| FaucetError::Config(format!("Cannot create log dir: {}", e)))?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(config.include_target);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(compact)
        .with(pretty)
        .with(file)
        .try_init()
        .map_err(|e| FaucetError::Config(format!("Failed to install logger: {}", e)))?;

    tracing::info!("Logging system initialized with level: {}", config.level);
    Ok(guard)
}

/// Build environment filter from configuration
fn build_env_filter(config: &LoggingConfig) -> FaucetResult<EnvFilter> {
    let mut filter_string = config.level.clone();

    // Add RUST_LOG environment variable if present
    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        if !rust_log.is_empty() {
            filter_string.push(',');
            filter_string.push_str(&rust_log);
        }
    }

    EnvFilter::try_new(&filter_string)
        .map_err(|e| FaucetError::Config(format!("Invalid log filter '{}': {}", filter_string, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::from("anything"), LogFormat::Pretty);
    }

    #[test]
    fn test_bad_level_is_config_error() {
        let config = LoggingConfig {
            level: "faucet=verbose".to_string(),
            ..LoggingConfig::default()
        };
        assert!(matches!(build_env_filter(&config), Err(FaucetError::Config(_))));
    }
}
