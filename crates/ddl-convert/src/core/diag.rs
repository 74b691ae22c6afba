//! Per-statement diagnostics collected while the pipeline runs.

use serde::{Deserialize, Serialize};

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational: a rule was applied as configured.
    Info,
    /// Something was degraded but the statement still converted.
    Warning,
    /// The statement (or a sub-step) failed.
    Error,
}

/// A single diagnostic attached to a conversion record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,

    /// Stable machine-readable code (e.g. "statement_skipped").
    pub code: String,

    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Create an INFO diagnostic.
    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a WARNING diagnostic.
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an ERROR diagnostic.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
        }
    }
}
