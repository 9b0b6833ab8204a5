//! Core conversion modules
//!
//! - `md2latex`: Markdown to LaTeX conversion

pub mod md2latex;
