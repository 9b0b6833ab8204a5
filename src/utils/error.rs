//! Error handling for md2tex callers
//!
//! The conversion engine itself never fails; it reports degraded spots as
//! warnings. This module holds the error type for the surrounding layer
//! (reading input, writing output) and the diagnostic type used to print
//! warnings.

use std::fmt;

/// Caller-level error type
#[derive(Debug, Clone)]
pub enum ConversionError {
    /// Invalid input or option value
    InvalidInput { message: String },
    /// IO error (for file operations)
    IoError { message: String },
    /// Serializing a report failed
    Serialization { message: String },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)
            }
            ConversionError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
            ConversionError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        ConversionError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConversionError {
    fn from(err: serde_json::Error) -> Self {
        ConversionError::Serialization {
            message: err.to_string(),
        }
    }
}

// Convenience constructors for errors
impl ConversionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConversionError::InvalidInput {
            message: message.into(),
        }
    }
}

// =============================================================================
// Terminal diagnostics
// =============================================================================

/// How serious a conversion warning is when shown on the terminal.
///
/// `--strict` fails the run on any `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// The output is not balanced LaTeX
    Error,
    /// Source content was dropped or left unconverted
    Warning,
    /// A default was substituted
    Info,
}

/// A conversion warning prepared for stderr.
#[derive(Debug, Clone)]
pub struct CliDiagnostic {
    pub severity: DiagnosticSeverity,
    /// `WarningKind` display name
    pub kind: String,
    pub message: String,
    /// The offending source fragment, such as `<div>` or a fence line
    pub location: Option<String>,
}

impl CliDiagnostic {
    pub fn new(
        severity: DiagnosticSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind: kind.into(),
            message: message.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// ANSI escape that opens the severity colour
    pub fn color_code(&self) -> &'static str {
        match self.severity {
            DiagnosticSeverity::Error => "\x1b[31m",   // red
            DiagnosticSeverity::Warning => "\x1b[33m", // yellow
            DiagnosticSeverity::Info => "\x1b[36m",    // cyan
        }
    }

    /// One stderr line; `--no-color` passes `false`
    pub fn render(&self, color: bool) -> String {
        if color {
            format!("{}{}\x1b[0m", self.color_code(), self)
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for CliDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref loc) = self.location {
            write!(f, "[{}] {}: {}", self.kind, loc, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.md");
        let err: ConversionError = io.into();
        assert!(err.to_string().starts_with("IO error"));
        assert!(err.to_string().contains("missing.md"));
    }

    #[test]
    fn test_invalid_input() {
        let err = ConversionError::invalid("indent must be a number");
        assert_eq!(err.to_string(), "Invalid input: indent must be a number");
    }

    #[test]
    fn test_diagnostic_render() {
        let diag = CliDiagnostic::new(DiagnosticSeverity::Warning, "unsupported html tag", "stripped")
            .with_location("<div>");
        assert_eq!(diag.render(false), "[unsupported html tag] <div>: stripped");
        let colored = diag.render(true);
        assert!(colored.starts_with("\x1b[33m"));
        assert!(colored.ends_with("\x1b[0m"));
    }
}
