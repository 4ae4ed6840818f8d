//! Error types for the scene exporter.

use crate::export::validate::ValidationIssue;
use thiserror::Error;

/// Result type alias using ExportError.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Main error type for export operations.
#[derive(Error, Debug)]
pub enum ExportError {
    /// No scene was supplied to the exporter.
    #[error("Scene is not defined: nothing to export")]
    MissingScene,

    /// Failed to parse or serialize JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The container would exceed the 32-bit length field of the GLB header.
    #[error("GLB container too large: {0} bytes")]
    ContainerTooLarge(usize),

    /// The emitted container does not match the length declared in its header.
    #[error("GLB length mismatch: header declares {declared} bytes, wrote {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    /// A GLB container could not be read back.
    #[error("Invalid GLB container: {0}")]
    InvalidContainer(String),

    /// The document failed validation in strict mode.
    #[error("Document failed validation with {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),
}
