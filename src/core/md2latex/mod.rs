//! Markdown to LaTeX converter
//!
//! This module implements the two-phase Markdown to LaTeX converter.
//! Multi-line tables and display math are first rewritten on the whole
//! document string, then a line-by-line pass tracks nested environments
//! and applies the inline substitution pipeline.

pub mod blocks;
pub mod context;
pub mod environment;
pub mod equation;
pub mod html;
pub mod markup;
pub mod mask;
pub mod table;
mod utils;

use serde::Serialize;

pub use context::{CodeStyle, ConversionState, Environment, M2LOptions};

// =============================================================================
// Warning System
// =============================================================================

/// Kind of warning generated during conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// An HTML tag without a LaTeX mapping was stripped
    UnsupportedHtmlTag,
    /// An `<img>` tag had no `src` attribute and was dropped
    MissingImageSource,
    /// A code fence carried no usable language name
    InvalidFenceLanguage,
    /// A pipe-delimited block had no alignment row and was left as text
    MalformedTable,
    /// A code block or display math block was still open at end of input
    UnclosedEnvironment,
}

impl std::fmt::Display for WarningKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningKind::UnsupportedHtmlTag => write!(f, "unsupported html tag"),
            WarningKind::MissingImageSource => write!(f, "missing image source"),
            WarningKind::InvalidFenceLanguage => write!(f, "invalid fence language"),
            WarningKind::MalformedTable => write!(f, "malformed table"),
            WarningKind::UnclosedEnvironment => write!(f, "unclosed environment"),
        }
    }
}

/// A warning generated during Markdown to LaTeX conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionWarning {
    /// The kind of warning
    pub kind: WarningKind,
    /// Human-readable message
    pub message: String,
    /// Location context (e.g., "<div>" or "line 42")
    pub location: Option<String>,
}

impl ConversionWarning {
    /// Create a new warning
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        ConversionWarning {
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Add location context to the warning
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Create an unsupported HTML tag warning
    pub fn unsupported_html_tag(name: &str) -> Self {
        ConversionWarning::new(
            WarningKind::UnsupportedHtmlTag,
            format!("HTML tag '{}' is not supported and was stripped", name),
        )
        .with_location(format!("<{}>", name))
    }

    /// Create a missing image source warning
    pub fn missing_image_source(tag: &str) -> Self {
        ConversionWarning::new(
            WarningKind::MissingImageSource,
            "Image tag has no 'src' attribute and was dropped",
        )
        .with_location(tag.to_string())
    }

    /// Create an invalid fence language warning
    pub fn invalid_fence_language(fence_line: &str, fallback: &str) -> Self {
        ConversionWarning::new(
            WarningKind::InvalidFenceLanguage,
            format!("Code fence has no valid language, using '{}'", fallback),
        )
        .with_location(fence_line.trim().to_string())
    }

    /// Create a malformed table warning
    pub fn malformed_table(first_row: &str) -> Self {
        ConversionWarning::new(
            WarningKind::MalformedTable,
            "Pipe-delimited block has no alignment row and was left unchanged",
        )
        .with_location(first_row.trim().to_string())
    }

    /// Create an unclosed environment warning
    pub fn unclosed_environment(env: &Environment) -> Self {
        ConversionWarning::new(
            WarningKind::UnclosedEnvironment,
            format!("{} is still open at end of input", env),
        )
    }
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref loc) = self.location {
            write!(f, "[{}] {}: {}", self.kind, loc, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

impl From<ConversionWarning> for crate::utils::error::CliDiagnostic {
    fn from(warning: ConversionWarning) -> Self {
        use crate::utils::error::{CliDiagnostic, DiagnosticSeverity};

        let severity = match warning.kind {
            WarningKind::UnclosedEnvironment => DiagnosticSeverity::Error,
            WarningKind::UnsupportedHtmlTag
            | WarningKind::MissingImageSource
            | WarningKind::MalformedTable => DiagnosticSeverity::Warning,
            WarningKind::InvalidFenceLanguage => DiagnosticSeverity::Info,
        };

        let mut diag = CliDiagnostic::new(severity, warning.kind.to_string(), warning.message);
        if let Some(loc) = warning.location {
            diag = diag.with_location(loc);
        }
        diag
    }
}

/// Result of conversion with diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    /// The converted output
    pub output: String,
    /// Warnings generated during conversion
    pub warnings: Vec<ConversionWarning>,
}

impl ConversionResult {
    /// Create a new result with warnings
    pub fn with_warnings(output: String, warnings: Vec<ConversionWarning>) -> Self {
        ConversionResult { output, warnings }
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// The environment stack returned to the document level
    pub fn is_balanced(&self) -> bool {
        !self
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::UnclosedEnvironment)
    }
}

// =============================================================================
// Converter
// =============================================================================

/// The two-phase Markdown converter
pub struct MarkdownConverter {
    options: M2LOptions,
}

impl MarkdownConverter {
    /// Create a new converter with default options
    pub fn new() -> Self {
        Self {
            options: M2LOptions::default(),
        }
    }

    /// Create a new converter with custom options
    pub fn with_options(options: M2LOptions) -> Self {
        Self { options }
    }

    /// Convert a Markdown document, collecting warnings
    pub fn convert(&self, input: &str) -> ConversionResult {
        // block patterns match on bare `\n`
        let input = input.replace("\r\n", "\n");
        let mut warnings = Vec::new();
        let extracted = blocks::extract_blocks(&input, &self.options, &mut warnings);

        let mut state = ConversionState::new(self.options.clone());
        state.warnings = warnings;
        environment::run(&extracted, &mut state);

        ConversionResult::with_warnings(state.output, state.warnings)
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert Markdown to LaTeX with the given options
pub fn convert(input: &str, options: &M2LOptions) -> ConversionResult {
    MarkdownConverter::with_options(options.clone()).convert(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warn = ConversionWarning::unsupported_html_tag("div");
        let msg = warn.to_string();
        assert!(msg.starts_with("[unsupported html tag] <div>:"));
    }

    #[test]
    fn test_warning_severity_mapping() {
        use crate::utils::error::{CliDiagnostic, DiagnosticSeverity};

        let diag: CliDiagnostic =
            ConversionWarning::unclosed_environment(&Environment::Equation {
                closer: "$$".to_string(),
            })
            .into();
        assert_eq!(diag.severity, DiagnosticSeverity::Error);

        let diag: CliDiagnostic = ConversionWarning::invalid_fence_language("```", "text").into();
        assert_eq!(diag.severity, DiagnosticSeverity::Info);
    }

    #[test]
    fn test_converter_reports_balance() {
        let result = MarkdownConverter::new().convert("```rust\nfn main() {}\n");
        assert!(!result.is_balanced());

        let result = MarkdownConverter::new().convert("```rust\nfn main() {}\n```\n");
        assert!(result.is_balanced());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_crlf_input_matches_lf_input() {
        let converter = MarkdownConverter::new();

        let table = converter.convert("| a | b |\r\n|:--|--:|\r\n| 1 | 2 |\r\n");
        assert!(table.output.contains("\\begin{tabular}{lr}"));
        assert!(!table.output.contains('\r'));
        assert!(!table.has_warnings());

        let equation = converter.convert("*==eq1==*\r\n$$\r\nx = 1\r\n$$\r\n");
        assert_eq!(
            equation.output,
            "\\begin{equation}\n    x = 1\n    \\label{eq1}\n\\end{equation}\n"
        );
    }

    #[test]
    fn test_warning_serializes_kebab_case() {
        let json = serde_json::to_string(&ConversionWarning::malformed_table("| a |")).unwrap();
        assert!(json.contains("\"malformed-table\""));
    }
}
