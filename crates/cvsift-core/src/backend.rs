use std::path::Path;

use thiserror::Error;

use crate::DocumentFormat;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for format-specific text extraction backends.
///
/// Implementors only report failures that prevent them from reading the
/// container at all. Damage confined to part of a document (one unreadable
/// PDF page, one malformed XML element) is logged and skipped inside the
/// backend, and whatever text was recovered is returned.
pub trait TextBackend: Send + Sync {
    /// The container format this backend reads.
    fn format(&self) -> DocumentFormat;

    /// Extract the full text content of the file at `path`.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}
