use apimark_ast::VisitError;
use apimark_diagnostics::{CollectedErrors, Diagnostic};
use thiserror::Error;

/// Errors produced while parsing a document (E3001–E3004).
#[derive(Debug, Error)]
pub enum ParseError {
    /// E3001: The producing step missed its deadline.
    #[error("{0}")]
    Timeout(Diagnostic),

    /// E3001: The caller cancelled the run.
    #[error("{0}")]
    Cancelled(Diagnostic),

    /// E3002: The extractor rejected the input.
    ///
    /// The bundled extractors never return this; it is the failure an
    /// [`Extractor`](crate::Extractor) implementation reports for input it
    /// cannot turn into a document.
    #[error("E3002: extraction failed: {0}")]
    Extraction(String),

    /// E3003: The background task panicked or was aborted.
    #[error("E3003: extraction task failed: {0}")]
    TaskFailed(String),

    /// E3004: A serialized document could not be read.
    #[error("E3004: invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Strict mode found validation errors.
    #[error("validation failed: {0}")]
    Validation(#[from] CollectedErrors),

    /// A visitor failed during traversal.
    #[error(transparent)]
    Traversal(#[from] VisitError),
}

impl ParseError {
    /// The diagnostic behind a timeout or cancellation, if any.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            ParseError::Timeout(d) | ParseError::Cancelled(d) => Some(d),
            _ => None,
        }
    }
}
