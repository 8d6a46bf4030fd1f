// ABOUTME: Logging configuration and structured logging setup for observability
// ABOUTME: Configures log levels, formatters, and output destinations
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured logging configuration built on `tracing-subscriber`.
//!
//! The engine itself only emits `tracing` events; embedding services decide
//! how those are rendered by calling [`init_logging`] (or installing their
//! own subscriber).

use crate::errors::{AppError, AppResult};
use std::env;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Service name reported in startup logs
    pub service_name: String,
}

/// Log output format options
#[derive(Debug, Clone)]
pub enum LogFormat {
    /// `JSON` format for production logging
    Json,
    /// Pretty format for development
    Pretty,
    /// Compact format for space-constrained environments
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            service_name: "trailmark".into(),
        }
    }
}

impl LoggingConfig {
    /// Build a configuration from `LOG_LEVEL` / `LOG_FORMAT` environment
    /// variables, falling back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(level) = env::var("LOG_LEVEL") {
            config.level = level;
        }
        match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => config.format = LogFormat::Json,
            Ok("compact") => config.format = LogFormat::Compact,
            _ => {}
        }
        config
    }
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the level string is not a valid filter directive or a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| AppError::config(format!("invalid log level '{}': {e}", config.level)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
    };
    result.map_err(|e| AppError::config(format!("failed to install subscriber: {e}")))?;

    info!(
        service = %config.service_name,
        level = %config.level,
        "logging initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(matches!(config.format, LogFormat::Pretty));
    }

    #[test]
    fn test_invalid_level_rejected() {
        let config = LoggingConfig {
            level: "not a [filter".into(),
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }
}
