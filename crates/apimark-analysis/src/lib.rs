//! Analysis passes over a [`Document`].
//!
//! Three visitors are built on the traversal protocol of `apimark-ast`:
//! structural validation, statistics collection and in-place
//! transformation. The free functions in this crate are the supported way
//! to run them.

pub mod statistics;
pub mod transform;
pub mod validation;

pub use statistics::{Statistics, StatisticsVisitor};
pub use transform::{TransformVisitor, Transformation};
pub use validation::{
    ValidationOptions, ValidationVisitor, HTTP_METHODS, PARAMETER_LOCATIONS, VALIDATION_SOURCE,
};

use apimark_ast::{Document, VisitError};
use apimark_diagnostics::Diagnostic;
use apimark_telemetry::events;

/// Validates `document`, returning every diagnostic found.
///
/// Rule violations never fail the call; `Err` only reports a traversal
/// failure.
pub fn validate_document(document: &Document, strict: bool) -> Result<Vec<Diagnostic>, VisitError> {
    validate_document_with(document, &ValidationOptions::new(strict))
}

/// Validates `document` with the optional rules in `options` enabled.
pub fn validate_document_with(
    document: &Document,
    options: &ValidationOptions,
) -> Result<Vec<Diagnostic>, VisitError> {
    let mut visitor = ValidationVisitor::new(options.clone());
    document.accept(&mut visitor)?;
    let diagnostics = visitor.into_diagnostics();
    tracing::debug!(
        event = events::DOCUMENT_VALIDATED,
        diagnostics = diagnostics.len(),
        endpoints = document.endpoints.len(),
        "document validated"
    );
    Ok(diagnostics)
}

/// Counts endpoints, parameters and schemas in `document`.
pub fn collect_statistics(document: &Document) -> Result<Statistics, VisitError> {
    let mut visitor = StatisticsVisitor::new();
    document.accept(&mut visitor)?;
    let statistics = visitor.finish();
    tracing::debug!(
        event = events::STATISTICS_COLLECTED,
        endpoints = statistics.total_endpoints,
        schemas = statistics.total_schemas,
        "statistics collected"
    );
    Ok(statistics)
}

/// Rewrites every endpoint of `document` in place.
///
/// Paths are lowercased, then each transformation runs in order.
pub fn transform_document(
    document: &mut Document,
    transformations: impl IntoIterator<Item = Transformation>,
) -> Result<(), VisitError> {
    let mut visitor = TransformVisitor::new();
    for transformation in transformations {
        visitor.push(transformation);
    }
    document.accept_mut(&mut visitor)?;
    tracing::debug!(
        event = events::DOCUMENT_TRANSFORMED,
        endpoints = document.endpoints.len(),
        transformations = visitor.len(),
        "document transformed"
    );
    Ok(())
}
