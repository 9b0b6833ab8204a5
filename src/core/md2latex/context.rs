//! Core state and structures for Markdown to LaTeX conversion
//!
//! This module contains the conversion options, the environment stack and
//! the per-run conversion state.

use std::fmt;
use std::str::FromStr;

use super::ConversionWarning;

// =============================================================================
// Markdown → LaTeX Conversion Options
// =============================================================================

/// How fenced and inline code is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeStyle {
    /// `lstlisting` environments and `\lstinline`
    Listing,
    /// `minted` environments and `\mintinline`
    #[default]
    Minted,
}

impl fmt::Display for CodeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeStyle::Listing => write!(f, "lstlisting"),
            CodeStyle::Minted => write!(f, "minted"),
        }
    }
}

impl FromStr for CodeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lstlisting" | "listing" | "listings" => Ok(CodeStyle::Listing),
            "minted" => Ok(CodeStyle::Minted),
            other => Err(format!("unknown code style '{}'", other)),
        }
    }
}

/// Options for Markdown to LaTeX conversion
#[derive(Debug, Clone)]
pub struct M2LOptions {
    /// Float placement attached to every emitted `figure` environment
    /// Default: "ht"
    pub figure_placement: String,

    /// Float placement attached to every emitted `table` environment
    /// Default: "ht"
    pub table_placement: String,

    /// Spaces per nesting level in emitted table, equation and list bodies
    /// Default: 4
    pub indent_width: usize,

    /// Rendering of fenced and inline code
    /// Default: minted
    pub code_style: CodeStyle,

    /// The surrounding document already carries a title, so `#` is title
    /// text (dropped) and `##` becomes `\section`
    /// Default: false
    pub title_present: bool,

    /// Prefix plain paragraph lines with `\par`
    /// Default: false
    pub paragraph_prefix: bool,
}

impl Default for M2LOptions {
    fn default() -> Self {
        Self {
            figure_placement: "ht".to_string(),
            table_placement: "ht".to_string(),
            indent_width: 4,
            code_style: CodeStyle::Minted,
            title_present: false,
            paragraph_prefix: false,
        }
    }
}

impl M2LOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Options rendering code through the `listings` package
    pub fn listings() -> Self {
        Self {
            code_style: CodeStyle::Listing,
            ..Self::default()
        }
    }

    /// Options for documents whose title is supplied by the template
    pub fn with_title() -> Self {
        Self {
            title_present: true,
            ..Self::default()
        }
    }

    /// Indentation string for the given nesting level
    pub fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_width * level)
    }
}

// =============================================================================
// Environment Stack
// =============================================================================

/// A nestable block context of the line pass
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Document,
    /// Literal code block; only a bare fence made of the same run closes it
    Raw { fence: String },
    /// Display math; `closer` is the environment name, or `$$`
    Equation { closer: String },
    /// Unordered list opened at the given indentation column
    Itemize { indent: usize },
    /// Ordered list opened at the given indentation column
    Enumerate { indent: usize },
    Table,
}

impl Environment {
    /// Lines inside this environment are copied verbatim
    pub fn is_verbatim(&self) -> bool {
        matches!(self, Environment::Raw { .. } | Environment::Equation { .. })
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            Environment::Itemize { .. } | Environment::Enumerate { .. }
        )
    }

    /// Indentation column of a list frame
    pub fn list_indent(&self) -> Option<usize> {
        match self {
            Environment::Itemize { indent } | Environment::Enumerate { indent } => Some(*indent),
            _ => None,
        }
    }

    /// LaTeX environment name used for list open/close markers
    pub fn latex_name(&self) -> &'static str {
        match self {
            Environment::Document => "document",
            Environment::Raw { .. } => "code",
            Environment::Equation { .. } => "equation",
            Environment::Itemize { .. } => "itemize",
            Environment::Enumerate { .. } => "enumerate",
            Environment::Table => "table",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Raw { fence } => write!(f, "code block ({})", fence),
            Environment::Equation { closer } => write!(f, "equation ({})", closer),
            other => write!(f, "{}", other.latex_name()),
        }
    }
}

/// Conversion state maintained during the line pass
#[derive(Debug)]
pub struct ConversionState {
    /// Stack of open environments; the bottom is always `Document`
    env_stack: Vec<Environment>,
    /// Accumulated LaTeX output
    pub output: String,
    /// Collected warnings
    pub warnings: Vec<ConversionWarning>,
    /// Conversion options
    pub options: M2LOptions,
}

impl ConversionState {
    pub fn new(options: M2LOptions) -> Self {
        Self {
            env_stack: vec![Environment::Document],
            output: String::new(),
            warnings: Vec::new(),
            options,
        }
    }

    /// Push a new environment onto the stack
    pub fn push_env(&mut self, env: Environment) {
        self.env_stack.push(env);
    }

    /// Pop the current environment; `Document` is never removed
    pub fn pop_env(&mut self) -> Option<Environment> {
        if self.env_stack.len() > 1 {
            self.env_stack.pop()
        } else {
            None
        }
    }

    /// Get current environment
    pub fn current_env(&self) -> &Environment {
        self.env_stack.last().unwrap_or(&Environment::Document)
    }

    pub fn depth(&self) -> usize {
        self.env_stack.len()
    }

    /// Number of list frames currently open
    pub fn list_depth(&self) -> usize {
        self.env_stack.iter().filter(|e| e.is_list()).count()
    }

    /// Environments above `Document`, innermost last
    pub fn open_environments(&self) -> &[Environment] {
        &self.env_stack[1..]
    }

    /// Append one output line
    pub fn emit(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    pub fn warn(&mut self, warning: ConversionWarning) {
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = M2LOptions::default();
        assert_eq!(opts.figure_placement, "ht");
        assert_eq!(opts.indent_width, 4);
        assert_eq!(opts.code_style, CodeStyle::Minted);
        assert!(!opts.title_present);
        assert_eq!(opts.indent(2).len(), 8);
    }

    #[test]
    fn test_code_style_parse() {
        assert_eq!("lstlisting".parse::<CodeStyle>(), Ok(CodeStyle::Listing));
        assert_eq!("Minted".parse::<CodeStyle>(), Ok(CodeStyle::Minted));
        assert!("verbatim".parse::<CodeStyle>().is_err());
    }

    #[test]
    fn test_document_is_never_popped() {
        let mut state = ConversionState::new(M2LOptions::default());
        assert_eq!(state.pop_env(), None);
        state.push_env(Environment::Itemize { indent: 0 });
        assert_eq!(state.depth(), 2);
        assert_eq!(state.list_depth(), 1);
        assert_eq!(state.pop_env(), Some(Environment::Itemize { indent: 0 }));
        assert_eq!(state.current_env(), &Environment::Document);
    }
}
