//! Structured diagnostics for apimark.
//!
//! A [`Diagnostic`] is a single-line, severity-leveled message with an
//! optional code, position and context. Diagnostics are built through
//! [`DiagnosticBuilder`] and aggregated by a bounded [`DiagnosticCollector`].

pub mod collector;
pub mod diagnostic;

pub use collector::{CollectedErrors, DiagnosticCollector, DEFAULT_MAX_ERRORS};
pub use diagnostic::{Category, Diagnostic, DiagnosticBuilder, Severity};
