//! # md2tex
//!
//! Markdown to LaTeX converter for academic writing.
//!
//! Converts headings, lists, pipe tables, display math, images, citations,
//! cross-references, inline emphasis, code and a small set of inline HTML
//! tags into a LaTeX fragment ready to be spliced into a document body.
//!
//! ## Example
//!
//! ```rust
//! use md2tex::{markdown_to_latex, markdown_to_latex_with_report, M2LOptions};
//!
//! let tex = markdown_to_latex("## Results\n\nGrowth was **50%** [@smith2020].");
//! assert!(tex.contains("\\section{Results}"));
//! assert!(tex.contains("\\textbf{50\\%}"));
//! assert!(tex.contains("\\cite{smith2020}"));
//!
//! let result = markdown_to_latex_with_report("<div>x</div>", &M2LOptions::default());
//! assert_eq!(result.warnings.len(), 1);
//! ```

pub mod core;
pub mod utils;

pub use crate::core::md2latex::{
    CodeStyle, ConversionResult, ConversionWarning, Environment, M2LOptions, MarkdownConverter,
    WarningKind,
};

/// Convert Markdown to LaTeX with default options
pub fn markdown_to_latex(input: &str) -> String {
    markdown_to_latex_with_options(input, &M2LOptions::default())
}

/// Convert Markdown to LaTeX with custom options
pub fn markdown_to_latex_with_options(input: &str, options: &M2LOptions) -> String {
    crate::core::md2latex::convert(input, options).output
}

/// Convert Markdown to LaTeX, returning the warnings collected on the way
pub fn markdown_to_latex_with_report(input: &str, options: &M2LOptions) -> ConversionResult {
    crate::core::md2latex::convert(input, options)
}
