//! Log output for `ts-ratchet`.
//!
//! Logging is off unless `RATCHET_LOG` (or `RUST_LOG`) holds filter
//! directives. `RATCHET_LOG_FORMAT` picks the rendering:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: `tracing-tree` blocks, one per pass and per worker thread
//! - `json`: one object per event, with the enclosing span
//!
//! ```bash
//! # Which files the structural pass skipped, and why
//! RATCHET_LOG=debug RATCHET_LOG_FORMAT=tree ts-ratchet --dry-run
//!
//! # Every issue that found no node
//! RATCHET_LOG="ratchet_engine::structural=trace" ts-ratchet -y
//! ```
//!
//! Everything is written to stderr; stdout carries only the step report.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown names fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// What the environment asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingSettings {
    pub directives: String,
    pub format: LogFormat,
}

impl TracingSettings {
    pub fn from_env() -> Option<Self> {
        Self::from_vars(
            std::env::var("RATCHET_LOG").ok(),
            std::env::var("RUST_LOG").ok(),
            std::env::var("RATCHET_LOG_FORMAT").ok(),
        )
    }

    /// `RATCHET_LOG` wins over `RUST_LOG`; neither set means no logging.
    pub fn from_vars(
        ratchet_log: Option<String>,
        rust_log: Option<String>,
        format: Option<String>,
    ) -> Option<Self> {
        let directives = ratchet_log.or(rust_log)?;
        Some(TracingSettings {
            directives,
            format: format.as_deref().map_or(LogFormat::Text, LogFormat::parse),
        })
    }

    fn install(&self) {
        let filter = EnvFilter::builder().parse_lossy(&self.directives);
        let registry = tracing_subscriber::registry().with(filter);

        match self.format {
            LogFormat::Tree => registry
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_writer(std::io::stderr)
                        .with_indent_lines(true)
                        .with_targets(true)
                        .with_thread_names(true)
                        .with_bracketed_fields(true),
                )
                .init(),
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_writer(std::io::stderr),
                )
                .init(),
            LogFormat::Text => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_thread_names(true),
                )
                .init(),
        }
    }
}

/// Install the global subscriber if the environment asks for logs.
pub fn init_tracing() {
    if let Some(settings) = TracingSettings::from_env() {
        settings.install();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("tree"), LogFormat::Tree);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
        assert_eq!(LogFormat::parse("fancy"), LogFormat::Text);
    }

    #[test]
    fn test_no_directives_disables_logging() {
        assert_eq!(TracingSettings::from_vars(None, None, var("tree")), None);
    }

    #[test]
    fn test_ratchet_log_takes_precedence() {
        let settings = TracingSettings::from_vars(var("ratchet_engine=trace"), var("warn"), None);
        assert_eq!(
            settings,
            Some(TracingSettings {
                directives: "ratchet_engine=trace".to_string(),
                format: LogFormat::Text,
            })
        );
    }

    #[test]
    fn test_rust_log_is_the_fallback() {
        let settings = TracingSettings::from_vars(None, var("debug"), var("json"));
        assert_eq!(
            settings,
            Some(TracingSettings {
                directives: "debug".to_string(),
                format: LogFormat::Json,
            })
        );
    }
}
