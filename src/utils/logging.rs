//! Logging Module
//!
//! `tracing` subscriber setup for the CLI client and the prediction server.
//! The CLI writes short colored lines for a person at a terminal, while the
//! server writes plain lines that carry the request span of every prediction.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::FmtSubscriber;

use crate::utils::error::{DiagnosisError, Result};

/// Line layout of the subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One short line per event
    Compact,
    /// Timestamp, level, target and span fields on every line
    Full,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub ansi_colors: bool,
    /// Show the module path of each event
    pub include_target: bool,
    pub include_thread_ids: bool,
    /// Emit an event when a span closes, with its busy/idle time
    pub span_timings: bool,
}

impl LogConfig {
    /// Terminal output for the CLI; `-v` raises the level to debug
    pub fn cli(verbose: bool) -> Self {
        Self {
            level: if verbose { Level::DEBUG } else { Level::WARN },
            format: LogFormat::Compact,
            ansi_colors: true,
            include_target: verbose,
            include_thread_ids: false,
            span_timings: false,
        }
    }

    /// Long-running server output
    pub fn server(level: Level) -> Self {
        Self {
            level,
            format: LogFormat::Full,
            ansi_colors: false,
            include_target: true,
            include_thread_ids: true,
            span_timings: level >= Level::DEBUG,
        }
    }
}

/// Parse a level name, falling back to `INFO` for anything unrecognized
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_lowercase().as_str() {
        "warning" => Level::WARN,
        other => Level::from_str(other).unwrap_or(Level::INFO),
    }
}

/// Install the global subscriber
///
/// Fails if a global subscriber has already been installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let span_events = if config.span_timings {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(config.level)
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .with_thread_ids(config.include_thread_ids)
        .with_span_events(span_events);

    let installed = match config.format {
        LogFormat::Compact => tracing::subscriber::set_global_default(builder.compact().finish()),
        LogFormat::Full => tracing::subscriber::set_global_default(builder.finish()),
    };

    installed.map_err(|e| DiagnosisError::Config(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("INFO"), Level::INFO);
        assert_eq!(parse_level(" Warning "), Level::WARN);
        assert_eq!(parse_level("loud"), Level::INFO);
    }

    #[test]
    fn test_presets() {
        let quiet = LogConfig::cli(false);
        assert_eq!(quiet.level, Level::WARN);
        assert_eq!(quiet.format, LogFormat::Compact);
        assert!(LogConfig::cli(true).include_target);

        let server = LogConfig::server(Level::INFO);
        assert!(!server.ansi_colors);
        assert!(!server.span_timings);
        assert!(LogConfig::server(Level::TRACE).span_timings);
    }
}
