//! # Logging & Tracing Infrastructure
//!
//! Configures the `tracing-subscriber` stack for the engine.
//!
//! ## Overview
//!
//! Engine crates emit structured events through the `tracing` macros; this
//! module owns the subscriber setup so hosts get consistent output without
//! each binary re-implementing filter plumbing. Filtering uses the standard
//! `EnvFilter` syntax, so `RUST_LOG=core_cache=debug,info` works as expected.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! init_logging(LoggingConfig::default().with_format(LogFormat::Compact))?;
//! tracing::info!("engine starting");
//! ```

use crate::error::{Error, Result};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format with colors
    Pretty,
    /// Compact single-line format for production
    Compact,
    /// Structured JSON format for machine parsing
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        #[cfg(debug_assertions)]
        return Self::Pretty;

        #[cfg(not(debug_assertions))]
        return Self::Compact;
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Default filter directive, overridable via `RUST_LOG`
    pub default_filter: String,
    /// Include span targets in output
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            default_filter: "info".to_string(),
            with_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }
}

/// Initialize the global tracing subscriber.
///
/// Fails if a global subscriber is already installed (e.g. called twice, or
/// the host set up its own); in that case the existing subscriber stays in
/// place and the engine's events still flow through it.
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))
        .map_err(|e| Error::Config(format!("invalid log filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(config.with_target))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(config.with_target))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(config.with_target))
            .try_init(),
    };

    result.map_err(|e| Error::Config(format!("failed to install subscriber: {e}")))
}
