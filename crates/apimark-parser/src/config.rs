//! Parse configuration.

use std::time::Duration;

use apimark_analysis::{ValidationOptions, HTTP_METHODS};
use serde::Deserialize;

/// How thoroughly a parsed document is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Structural rules only.
    #[default]
    Basic,
    /// Adds description warnings and aborts on errors.
    Strict,
    /// Strict, plus example and nesting depth checks.
    Pedantic,
}

impl ValidationLevel {
    /// Parse from string, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "strict" => Some(Self::Strict),
            "pedantic" => Some(Self::Pedantic),
            _ => None,
        }
    }
}

/// Error recovery knobs handed to the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    pub enabled: bool,
    pub max_attempts: u32,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
        }
    }
}

/// Options for one parse run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Abort with an aggregate error when validation finds any error.
    pub strict_mode: bool,
    pub recovery: RecoveryConfig,
    /// Deadline for the producing step in milliseconds (default: 30000).
    pub timeout_ms: u64,
    /// Methods endpoints may use (default: the seven standard verbs).
    pub allowed_methods: Vec<String>,
    pub validation_level: ValidationLevel,
    /// Warn about parameters without an example.
    pub require_examples: bool,
    /// Warn about schemas nested deeper than this; `0` disables the check.
    pub max_nesting_depth: usize,
    /// Collector limit before the overflow marker (default: 100).
    pub max_errors: usize,
    /// Capacity hint for diagnostic buffers.
    pub initial_capacity: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            recovery: RecoveryConfig::default(),
            timeout_ms: 30_000,
            allowed_methods: HTTP_METHODS.iter().map(|m| m.to_string()).collect(),
            validation_level: ValidationLevel::Basic,
            require_examples: false,
            max_nesting_depth: 32,
            max_errors: apimark_diagnostics::DEFAULT_MAX_ERRORS,
            initial_capacity: 16,
        }
    }
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_validation_level(mut self, level: ValidationLevel) -> Self {
        self.validation_level = level;
        self
    }

    pub fn with_allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_require_examples(mut self, require: bool) -> Self {
        self.require_examples = require;
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_max_errors(mut self, max: usize) -> Self {
        self.max_errors = max;
        self
    }

    pub fn with_recovery(mut self, recovery: RecoveryConfig) -> Self {
        self.recovery = recovery;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Strict when either the flag or the validation level asks for it.
    pub fn is_strict(&self) -> bool {
        self.strict_mode || self.validation_level >= ValidationLevel::Strict
    }

    /// The validation rules this configuration enables.
    pub fn validation_options(&self) -> ValidationOptions {
        let mut options = ValidationOptions::new(self.is_strict())
            .with_require_examples(
                self.require_examples || self.validation_level == ValidationLevel::Pedantic,
            )
            .with_allowed_methods(self.allowed_methods.iter().cloned());
        if self.max_nesting_depth > 0 {
            options = options.with_max_schema_depth(self.max_nesting_depth);
        }
        options
    }
}
