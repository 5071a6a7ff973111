//! Bounded aggregation of diagnostics.

use apimark_telemetry::events;
use thiserror::Error;

use crate::diagnostic::{Category, Diagnostic};

/// Default limit on collected errors.
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// Code carried by the synthetic overflow diagnostic.
const TOO_MANY_ERRORS_CODE: &str = "F0001";

/// Aggregates diagnostics, splitting them into errors and warnings.
///
/// Once the error count reaches `max_errors`, one synthetic fatal
/// diagnostic is appended and the limit is no longer enforced; later errors
/// are accepted but not stored, so the error list holds at most
/// `max_errors + 1` entries. Info diagnostics are neither errors nor
/// warnings and are not kept. A `max_errors` of `0` disables the limit.
#[derive(Debug, Clone)]
pub struct DiagnosticCollector {
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    max_errors: usize,
    context: Option<String>,
    limit_reached: bool,
    dropped: usize,
}

impl Default for DiagnosticCollector {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERRORS)
    }
}

impl DiagnosticCollector {
    pub fn new(max_errors: usize) -> Self {
        Self::with_capacity(max_errors, 0)
    }

    /// Creates a collector whose buffers are pre-sized to `capacity`.
    pub fn with_capacity(max_errors: usize, capacity: usize) -> Self {
        Self {
            errors: Vec::with_capacity(capacity),
            warnings: Vec::with_capacity(capacity),
            max_errors,
            context: None,
            limit_reached: false,
            dropped: 0,
        }
    }

    /// Sets the ambient context back-filled into diagnostics that have none.
    pub fn set_context(&mut self, context: impl Into<String>) {
        self.context = Some(context.into());
    }

    pub fn clear_context(&mut self) {
        self.context = None;
    }

    pub fn add(&mut self, mut diagnostic: Diagnostic) {
        if let Some(context) = &self.context {
            diagnostic.backfill_context(context);
        }

        if diagnostic.is_error() {
            if self.limit_reached {
                self.dropped += 1;
                return;
            }
            self.errors.push(diagnostic);
            if self.max_errors > 0 && self.errors.len() >= self.max_errors {
                self.limit_reached = true;
                tracing::warn!(
                    event = events::COLLECTOR_OVERFLOW,
                    limit = self.max_errors,
                    "diagnostic error limit reached"
                );
                self.errors.push(
                    Diagnostic::fatal(
                        Category::Validation,
                        format!("too many errors (limit: {})", self.max_errors),
                    )
                    .with_code(TOO_MANY_ERRORS_CODE)
                    .build(),
                );
            }
        } else if diagnostic.is_warning() {
            self.warnings.push(diagnostic);
        }
    }

    /// Adds every diagnostic in order.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.add(diagnostic);
        }
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Number of errors accepted after the limit was reached.
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn has_fatal_errors(&self) -> bool {
        self.errors.iter().any(Diagnostic::is_fatal)
    }

    /// Folds the collected errors into a single error value, if any.
    pub fn to_error(&self) -> Option<CollectedErrors> {
        if self.errors.is_empty() {
            None
        } else {
            Some(CollectedErrors {
                errors: self.errors.clone(),
            })
        }
    }

    /// Consumes the collector, returning `(errors, warnings)`.
    pub fn into_parts(self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        (self.errors, self.warnings)
    }
}

/// Aggregate of every error a collector held.
///
/// Displays as the single error's rendering, or as all renderings joined
/// with `"; "`.
#[derive(Debug, Clone, Error)]
#[error("{}", render_joined(.errors))]
pub struct CollectedErrors {
    errors: Vec<Diagnostic>,
}

impl CollectedErrors {
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Diagnostic> {
        self.errors
    }
}

fn render_joined(errors: &[Diagnostic]) -> String {
    errors
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
