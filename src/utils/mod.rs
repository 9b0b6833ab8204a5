//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types for caller-level failures
//! - Diagnostics for presenting conversion warnings

pub mod error;

// Re-export commonly used items
pub use error::{CliDiagnostic, ConversionError, DiagnosticSeverity};
