use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
pub mod text_utils;

// Re-export for convenience
pub use backend::{BackendError, TextBackend};
pub use text_utils::{expand_ligatures, normalize_pdf_text};

/// Message attached to every successful [`ParseResult`].
pub const SUCCESS_MESSAGE: &str =
    "Resume parsed successfully. Please review and edit the extracted information.";

/// Prefix for every failure message surfaced in a [`ParseResult`].
pub const FAILURE_PREFIX: &str = "Error parsing resume";

/// Container formats the pipeline can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Map a bare extension (`"pdf"`, `".DOCX"`, ...) to a format, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.');
        if ext.eq_ignore_ascii_case("pdf") {
            Some(DocumentFormat::Pdf)
        } else if ext.eq_ignore_ascii_case("docx") {
            Some(DocumentFormat::Docx)
        } else {
            None
        }
    }

    /// Detect the format from the extension of a path or filename.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => f.write_str("PDF"),
            DocumentFormat::Docx => f.write_str("DOCX"),
        }
    }
}

/// Normalized text extracted from a résumé.
///
/// Can only be constructed from input that contains at least one
/// non-whitespace character, so holding one means there is something to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Wrap extracted text, returning `None` when it is empty or whitespace-only.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ExtractedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The record handed back to callers for every parse attempt.
///
/// Absent fields are empty strings, never null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Comma-separated skill list, category boundaries flattened.
    pub skills: String,
    pub success: bool,
    pub message: String,
}

impl ParseResult {
    /// Build a successful result, substituting empty strings for absent fields.
    pub fn success(
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        skills: String,
    ) -> Self {
        Self {
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            skills,
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    /// Build a failed result with every field empty.
    pub fn failure(cause: impl fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("{FAILURE_PREFIX}: {cause}"),
            ..Default::default()
        }
    }
}
