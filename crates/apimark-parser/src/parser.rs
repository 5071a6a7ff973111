use std::sync::Arc;

use apimark_analysis::{validate_document_with, VALIDATION_SOURCE};
use apimark_ast::Document;
use apimark_diagnostics::{Category, Diagnostic, DiagnosticCollector};
use apimark_telemetry::events;
use tokio::sync::watch;

use crate::config::ParseConfig;
use crate::error::ParseError;
use crate::extract::{Extractor, MarkdownExtractor};

/// Code carried by timeout and cancellation diagnostics.
const TIMEOUT_CODE: &str = "E3001";

/// A validated document and the diagnostics found while producing it.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub document: Document,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Runs extraction and validation for one input at a time.
#[derive(Clone)]
pub struct Parser {
    config: ParseConfig,
    extractor: Arc<dyn Extractor>,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(ParseConfig::default())
    }
}

impl Parser {
    /// A parser backed by the [`MarkdownExtractor`].
    pub fn new(config: ParseConfig) -> Self {
        Self::with_extractor(config, MarkdownExtractor)
    }

    pub fn with_extractor(config: ParseConfig, extractor: impl Extractor + 'static) -> Self {
        Self {
            config,
            extractor: Arc::new(extractor),
        }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// Parses `input` with only the configured deadline as a bound.
    pub async fn parse(&self, input: impl Into<String>) -> Result<ParseOutcome, ParseError> {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        self.parse_cancellable(input, cancel_rx).await
    }

    /// Parses `input`, giving up when `cancel` turns `true` or the deadline
    /// passes, whichever comes first.
    ///
    /// The background extraction is not interrupted on cancellation or
    /// timeout; it runs to completion and its result is discarded. In strict
    /// mode any collected error fails the run with [`ParseError::Validation`].
    pub async fn parse_cancellable(
        &self,
        input: impl Into<String>,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<ParseOutcome, ParseError> {
        let input = input.into();
        tracing::debug!(
            event = events::PARSE_STARTED,
            bytes = input.len(),
            strict = self.config.is_strict(),
            "parsing document"
        );

        let extractor = Arc::clone(&self.extractor);
        let config = self.config.clone();
        let task = tokio::task::spawn_blocking(move || extractor.extract(&input, &config));
        let timeout = self.config.timeout();

        let mut document = tokio::select! {
            joined = task => match joined {
                Ok(Ok(document)) => document,
                Ok(Err(e)) => {
                    tracing::warn!(event = events::EXTRACTION_FAILED, error = %e, "extraction failed");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(event = events::EXTRACTION_FAILED, error = %e, "extraction task failed");
                    return Err(ParseError::TaskFailed(e.to_string()));
                }
            },
            _ = tokio::time::sleep(timeout) => {
                tracing::warn!(
                    event = events::PARSE_TIMEOUT,
                    timeout_ms = self.config.timeout_ms,
                    "extraction timed out"
                );
                return Err(ParseError::Timeout(
                    Diagnostic::error(
                        Category::Timeout,
                        format!("parse timed out after {}ms", self.config.timeout_ms),
                    )
                    .with_code(TIMEOUT_CODE)
                    .in_source("parser")
                    .build(),
                ));
            }
            _ = cancelled(&mut cancel) => {
                tracing::warn!(event = events::PARSE_CANCELLED, "parse cancelled");
                return Err(ParseError::Cancelled(
                    Diagnostic::error(Category::Timeout, "parse cancelled")
                        .with_code(TIMEOUT_CODE)
                        .in_source("parser")
                        .build(),
                ));
            }
        };

        let mut collector =
            DiagnosticCollector::with_capacity(self.config.max_errors, self.config.initial_capacity);

        // A cached document still carries the diagnostics of its last validation.
        document
            .diagnostics
            .retain(|d| d.source_component() != Some(VALIDATION_SOURCE));

        collector.set_context("extraction");
        collector.extend(document.diagnostics.iter().cloned());
        collector.clear_context();

        let validation = validate_document_with(&document, &self.config.validation_options())?;
        collector.extend(validation.iter().cloned());
        document.diagnostics.extend(validation);

        if self.config.is_strict() {
            if let Some(errors) = collector.to_error() {
                tracing::warn!(
                    event = events::VALIDATION_FAILURE,
                    errors = collector.error_count(),
                    "strict validation failed"
                );
                return Err(ParseError::Validation(errors));
            }
        }

        let (errors, warnings) = collector.into_parts();
        tracing::info!(
            event = events::PARSE_COMPLETED,
            endpoints = document.endpoints.len(),
            components = document.components.len(),
            errors = errors.len(),
            warnings = warnings.len(),
            "document parsed"
        );

        Ok(ParseOutcome {
            document,
            errors,
            warnings,
        })
    }
}

/// Resolves once the signal reads `true`; never resolves if the sender is
/// dropped first.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::config::ValidationLevel;
    use crate::extract::JsonExtractor;

    const USERS_API: &str = r#"{
        "frontmatter": { "title": "Users", "version": "1.0.0", "line": 1 },
        "endpoints": [
            {
                "method": "GET",
                "path": "/users/{id}",
                "description": "Fetch one user.",
                "parameters": [{ "name": "id", "in": "path", "type": "string", "required": true }],
                "line": 5
            }
        ]
    }"#;

    /// Blocks its thread before returning an empty document.
    struct SlowExtractor(Duration);

    impl Extractor for SlowExtractor {
        fn extract(&self, _input: &str, _config: &ParseConfig) -> Result<Document, ParseError> {
            std::thread::sleep(self.0);
            Ok(Document::new())
        }
    }

    /// Rejects every input.
    struct RejectingExtractor;

    impl Extractor for RejectingExtractor {
        fn extract(&self, _input: &str, _config: &ParseConfig) -> Result<Document, ParseError> {
            Err(ParseError::Extraction("unterminated frontmatter block".into()))
        }
    }

    /// Returns a fixed document, including extraction diagnostics.
    struct FixedExtractor(Document);

    impl Extractor for FixedExtractor {
        fn extract(&self, _input: &str, _config: &ParseConfig) -> Result<Document, ParseError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn markdown_parse_reports_missing_endpoints() {
        let outcome = Parser::default().parse("# Empty\n").await.unwrap();
        assert!(outcome.document.endpoints.is_empty());
        assert!(outcome.has_errors());
        assert!(outcome.errors[0].message().contains("at least one endpoint"));
        assert_eq!(outcome.document.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn strict_mode_aborts_on_errors() {
        let parser = Parser::new(ParseConfig::new().with_strict_mode(true));
        let err = parser.parse("# Empty\n").await.unwrap_err();
        match err {
            ParseError::Validation(errors) => assert_eq!(errors.errors().len(), 1),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_json_document() {
        let parser = Parser::with_extractor(
            ParseConfig::new().with_validation_level(ValidationLevel::Strict),
            JsonExtractor,
        );
        let outcome = parser.parse(USERS_API).await.unwrap();
        assert!(!outcome.has_errors());
        assert!(!outcome.has_warnings());
        assert_eq!(outcome.document.endpoints.len(), 1);
    }

    #[tokio::test]
    async fn pedantic_warnings_do_not_abort() {
        let parser = Parser::with_extractor(
            ParseConfig::new().with_validation_level(ValidationLevel::Pedantic),
            JsonExtractor,
        );
        let outcome = parser.parse(USERS_API).await.unwrap();
        assert!(!outcome.has_errors());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].code(), Some("W2102"));
    }

    #[tokio::test]
    async fn extraction_diagnostics_get_context() {
        let mut document = Document::new();
        document.endpoints.push(apimark_ast::Endpoint::new("GET", "/a"));
        document
            .diagnostics
            .push(Diagnostic::warning(Category::Table, "ragged table row").at_line(3).build());

        let parser = Parser::with_extractor(ParseConfig::default(), FixedExtractor(document));
        let outcome = parser.parse("").await.unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].context(), Some("extraction"));
    }

    #[tokio::test]
    async fn reparsing_cached_document_does_not_repeat_diagnostics() {
        let parser = Parser::with_extractor(ParseConfig::default(), JsonExtractor);
        let mut input = r#"{"endpoints":[{"method":"FETCH","path":"/a","line":3}]}"#.to_string();

        for _ in 0..3 {
            let outcome = parser.parse(input.as_str()).await.unwrap();
            assert_eq!(outcome.errors.len(), 1);
            assert_eq!(outcome.errors[0].code(), Some("E2003"));
            assert_eq!(outcome.errors[0].context(), Some("endpoint[FETCH /a]"));
            assert_eq!(outcome.document.diagnostics.len(), 1);
            input = serde_json::to_string(&outcome.document).unwrap();
        }

        let strict = Parser::with_extractor(ParseConfig::new().with_strict_mode(true), JsonExtractor);
        let fixed = input.replace("FETCH", "GET");
        let outcome = strict.parse(fixed).await.unwrap();
        assert!(!outcome.has_errors());
        assert!(outcome
            .document
            .diagnostics
            .iter()
            .all(|d| d.code() == Some("W2005")));
    }

    #[tokio::test]
    async fn collector_limit_applies() {
        let mut document = Document::new();
        for method in ["FETCH", "PULL", "PUSH"] {
            document.endpoints.push(apimark_ast::Endpoint::new(method, "/a"));
        }
        let parser = Parser::with_extractor(
            ParseConfig::new().with_max_errors(2),
            FixedExtractor(document),
        );
        let outcome = parser.parse("").await.unwrap();
        assert_eq!(outcome.errors.len(), 3);
        assert!(outcome.errors[2].is_fatal());
    }

    #[tokio::test]
    async fn timeout_returns_timeout_error() {
        let parser = Parser::with_extractor(
            ParseConfig::new().with_timeout(Duration::from_millis(20)),
            SlowExtractor(Duration::from_millis(300)),
        );
        let err = parser.parse("").await.unwrap_err();
        assert!(matches!(err, ParseError::Timeout(_)));
        let diagnostic = err.diagnostic().unwrap();
        assert_eq!(diagnostic.category(), Category::Timeout);
        assert_eq!(diagnostic.to_string(), "[E3001] in parser parse timed out after 20ms");
    }

    #[tokio::test]
    async fn cancellation_wins_over_slow_extraction() {
        let parser = Parser::with_extractor(
            ParseConfig::default(),
            SlowExtractor(Duration::from_millis(300)),
        );
        let (cancel_tx, cancel_rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = cancel_tx.send(true);
        });

        let err = parser.parse_cancellable("", cancel_rx).await.unwrap_err();
        assert!(matches!(err, ParseError::Cancelled(_)));
        assert_eq!(err.diagnostic().unwrap().category(), Category::Timeout);
    }

    #[tokio::test]
    async fn dropped_sender_does_not_cancel() {
        let parser = Parser::with_extractor(ParseConfig::default(), JsonExtractor);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        drop(cancel_tx);
        let outcome = parser.parse_cancellable(USERS_API, cancel_rx).await.unwrap();
        assert_eq!(outcome.document.endpoints.len(), 1);
    }

    #[tokio::test]
    async fn extraction_failure_is_returned() {
        let parser = Parser::with_extractor(ParseConfig::default(), RejectingExtractor);
        let err = parser.parse("---\ntitle: x\n").await.unwrap_err();
        assert!(matches!(err, ParseError::Extraction(_)));
        assert!(err.diagnostic().is_none());
        assert_eq!(
            err.to_string(),
            "E3002: extraction failed: unterminated frontmatter block"
        );
    }

    #[tokio::test]
    async fn extractor_errors_propagate() {
        let parser = Parser::with_extractor(ParseConfig::default(), JsonExtractor);
        let err = parser.parse("{").await.unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }
}
