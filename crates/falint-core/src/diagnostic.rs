//! Diagnostic type for lint findings and syntax problems
//!
//! Both the lexer/parser and the rule evaluator report through the same
//! Diagnostic type so hosts have a single formatting surface.

use crate::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic schema version
pub const DIAG_VERSION: u32 = 1;

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// A lint finding or syntax error
    Error,
    /// Advisory output that does not affect exit status
    Warning,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Error => write!(f, "error"),
            DiagnosticLevel::Warning => write!(f, "warning"),
        }
    }
}

/// A single reported finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Diagnostic schema version
    pub diag_version: u32,
    /// Severity level
    pub level: DiagnosticLevel,
    /// Rule or error code (e.g. "FA100")
    pub code: String,
    /// Main diagnostic message
    pub message: String,
    /// File path
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (0-based)
    pub column: usize,
    /// Character range in the source, when known
    pub span: Span,
}

impl Diagnostic {
    /// Create a new error diagnostic with code
    pub fn error_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            diag_version: DIAG_VERSION,
            level: DiagnosticLevel::Error,
            code: code.into(),
            message: message.into(),
            file: "<unknown>".to_string(),
            line: 1,
            column: 0,
            span,
        }
    }

    /// Create a new warning diagnostic with code
    pub fn warning_with_code(
        code: impl Into<String>,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            ..Self::error_with_code(code, message, span)
        }
    }

    /// Set the file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    /// Set the line number
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Set the column number
    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }

    /// Format as human-readable string
    pub fn to_human_string(&self) -> String {
        format!(
            "{}[{}]: {}\n  --> {}:{}:{}\n",
            self.level, self.code, self.message, self.file, self.line, self.column
        )
    }

    /// Format as pretty JSON string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as compact JSON string
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Code registry
pub mod codes {
    // FA1xx - Lint findings
    /// Deferred-style typing imports without the future import
    pub const MISSING_IMPORT: &str = "FA100";
    /// Future import missing while the force flag is set
    pub const MISSING_IMPORT_FORCED: &str = "FA101";
    /// Simplified type annotations without the future import
    pub const SIMPLIFIED_TYPES: &str = "FA102";

    // FA9xx - Syntax problems reported by the bundled lexer/parser
    pub const SYNTAX_ERROR: &str = "FA900";
    pub const UNEXPECTED_CHARACTER: &str = "FA901";
    pub const UNTERMINATED_STRING: &str = "FA902";
    pub const INCONSISTENT_INDENTATION: &str = "FA903";
}
