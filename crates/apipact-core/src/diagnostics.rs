//! Diagnostics collected during a compilation pass
//!
//! The compiler takes an explicit sink instead of writing through a global
//! logger, so a pass stays a pure function of its input document. Callers
//! decide how entries are rendered (the CLI prints them to stderr).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How serious a diagnostic is. Warnings describe spec gaps the compiler
/// worked around; errors mark dropped contracts or operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// One recorded anomaly, scoped to an operation when one applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Operation label, e.g. "GET /items/{id}", when the anomaly is scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.operation {
            Some(operation) => write!(f, "{label}: {operation}: {}", self.message),
            None => write!(f, "{label}: {}", self.message),
        }
    }
}

/// Append-only diagnostic sink threaded through a compilation pass.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, operation: Option<&str>, message: impl Into<String>) {
        self.push(Severity::Warning, operation, message);
    }

    pub fn error(&mut self, operation: Option<&str>, message: impl Into<String>) {
        self.push(Severity::Error, operation, message);
    }

    fn push(&mut self, severity: Severity, operation: Option<&str>, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity,
            operation: operation.map(str::to_string),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.severity == Severity::Error)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
