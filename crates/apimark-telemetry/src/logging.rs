//! Structured logging setup.

use crate::{LogFormat, LoggingConfig, TelemetryError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Fails if a global
/// subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Json => init_json_logging(filter),
        LogFormat::Pretty => init_pretty_logging(filter),
    }
}

fn init_json_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let json_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_current_span(true)
        .with_span_list(false)
        .flatten_event(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(json_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

fn init_pretty_logging(filter: EnvFilter) -> Result<(), TelemetryError> {
    let pretty_layer = fmt::layer()
        .pretty()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(pretty_layer)
        .try_init()
        .map_err(|e: tracing_subscriber::util::TryInitError| {
            TelemetryError::LoggingInit(e.to_string())
        })
}

/// Standard values of the `event` field.
pub mod events {
    /// A parse run started.
    pub const PARSE_STARTED: &str = "parse_started";

    /// A parse run produced a document.
    pub const PARSE_COMPLETED: &str = "parse_completed";

    /// The producing step did not finish before its deadline.
    pub const PARSE_TIMEOUT: &str = "parse_timeout";

    /// The caller cancelled a parse run.
    pub const PARSE_CANCELLED: &str = "parse_cancelled";

    /// The producing step failed.
    pub const EXTRACTION_FAILED: &str = "extraction_failed";

    /// Validation found errors in strict mode.
    pub const VALIDATION_FAILURE: &str = "validation_failure";

    /// The Markdown producer ran.
    pub const MARKDOWN_EXTRACTED: &str = "markdown_extracted";

    /// A validation pass finished.
    pub const DOCUMENT_VALIDATED: &str = "document_validated";

    /// A statistics pass finished.
    pub const STATISTICS_COLLECTED: &str = "statistics_collected";

    /// A transformation pass finished.
    pub const DOCUMENT_TRANSFORMED: &str = "document_transformed";

    /// A transformation returned a node of the wrong kind.
    pub const TRANSFORM_IGNORED: &str = "transform_ignored";

    /// A collector hit its error limit.
    pub const COLLECTOR_OVERFLOW: &str = "collector_overflow";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_distinct() {
        let names = [
            events::PARSE_STARTED,
            events::PARSE_COMPLETED,
            events::PARSE_TIMEOUT,
            events::PARSE_CANCELLED,
            events::EXTRACTION_FAILED,
            events::VALIDATION_FAILURE,
            events::MARKDOWN_EXTRACTED,
            events::DOCUMENT_VALIDATED,
            events::STATISTICS_COLLECTED,
            events::DOCUMENT_TRANSFORMED,
            events::TRANSFORM_IGNORED,
            events::COLLECTOR_OVERFLOW,
        ];
        let unique: std::collections::HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(names
            .iter()
            .all(|name| name.chars().all(|c| c.is_ascii_lowercase() || c == '_')));
    }

    #[test]
    fn second_init_fails() {
        let config = LoggingConfig::new().with_log_level("warn");
        let _ = init_logging(&config);
        let err = init_logging(&config).unwrap_err();
        assert!(err.to_string().starts_with("failed to initialize logging"));
    }
}
