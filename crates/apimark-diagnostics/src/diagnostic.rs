use std::fmt;

use serde::{Deserialize, Serialize};

/// What part of the pipeline a diagnostic concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Syntax,
    Validation,
    Config,
    Timeout,
    Schema,
    Table,
    Frontmatter,
    Endpoint,
    Reference,
}

impl Category {
    /// Returns the lowercase name used in serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Syntax => "syntax",
            Category::Validation => "validation",
            Category::Config => "config",
            Category::Timeout => "timeout",
            Category::Schema => "schema",
            Category::Table => "table",
            Category::Frontmatter => "frontmatter",
            Category::Endpoint => "endpoint",
            Category::Reference => "reference",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a diagnostic, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// A single structured processing message.
///
/// Diagnostics are immutable once built. A line of `0` means the position
/// is unknown and is left out of the rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    message: String,
    #[serde(default)]
    line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    severity: Severity,
}

impl Diagnostic {
    /// Starts a diagnostic with [`Severity::Error`].
    pub fn new(category: Category, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(category, message, Severity::Error)
    }

    /// Starts an error diagnostic.
    pub fn error(category: Category, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(category, message, Severity::Error)
    }

    /// Starts a warning diagnostic.
    pub fn warning(category: Category, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(category, message, Severity::Warning)
    }

    /// Starts a fatal diagnostic.
    pub fn fatal(category: Category, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(category, message, Severity::Fatal)
    }

    /// Starts an informational diagnostic.
    pub fn info(category: Category, message: impl Into<String>) -> DiagnosticBuilder {
        DiagnosticBuilder::new(category, message, Severity::Info)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn source_component(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// `true` for error and fatal severities.
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Fatal)
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }

    /// Fills in the context when none was set at build time.
    pub(crate) fn backfill_context(&mut self, context: &str) {
        if self.context.is_none() {
            self.context = Some(context.to_string());
        }
    }
}

/// Renders `[code] line L:C in SOURCE message (suggestion: ...)`, leaving out
/// every absent part.
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::with_capacity(5);

        if let Some(code) = &self.code {
            parts.push(format!("[{}]", code));
        }
        if self.line > 0 {
            match self.column {
                Some(column) => parts.push(format!("line {}:{}", self.line, column)),
                None => parts.push(format!("line {}", self.line)),
            }
        }
        if let Some(source) = &self.source {
            parts.push(format!("in {}", source));
        }
        parts.push(self.message.clone());
        if let Some(suggestion) = &self.suggestion {
            parts.push(format!("(suggestion: {})", suggestion));
        }

        f.write_str(&parts.join(" "))
    }
}

impl std::error::Error for Diagnostic {}

/// Fluent builder for [`Diagnostic`]. The severity is fixed by the entry
/// point that created the builder.
#[derive(Debug, Clone)]
#[must_use]
pub struct DiagnosticBuilder {
    inner: Diagnostic,
}

impl DiagnosticBuilder {
    fn new(category: Category, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            inner: Diagnostic {
                category,
                code: None,
                message: message.into(),
                line: 0,
                column: None,
                context: None,
                suggestion: None,
                source: None,
                severity,
            },
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.inner.code = Some(code.into());
        self
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.inner.line = line;
        self
    }

    pub fn at_column(mut self, column: usize) -> Self {
        self.inner.column = Some(column);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.inner.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.inner.suggestion = Some(suggestion.into());
        self
    }

    /// Tags the component that produced the diagnostic.
    pub fn in_source(mut self, source: impl Into<String>) -> Self {
        self.inner.source = Some(source.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        self.inner
    }
}
