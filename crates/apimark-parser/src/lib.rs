//! Parse orchestration for Markdown API documentation.
//!
//! A [`Parser`] runs an [`Extractor`] on a background task, bounded by a
//! deadline and an optional cancellation signal, then validates the
//! resulting [`Document`](apimark_ast::Document) and returns it with its
//! diagnostics.

pub mod config;
pub mod error;
pub mod extract;
pub mod parser;

pub use config::{ParseConfig, RecoveryConfig, ValidationLevel};
pub use error::ParseError;
pub use extract::{Extractor, JsonExtractor, MarkdownExtractor};
pub use parser::{ParseOutcome, Parser};
