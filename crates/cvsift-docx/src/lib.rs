//! Word (`.docx`) backend for [`TextBackend`].
//!
//! A `.docx` file is a zip package; the body text lives in
//! `word/document.xml`. Paragraph texts are joined with `\n` in document
//! order.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use cvsift_core::{BackendError, DocumentFormat, TextBackend};

mod xml_parser;

pub use xml_parser::{ParsedBody, parse_document_xml};

/// Package entry holding the main document body.
pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxBackend;

impl DocxBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TextBackend for DocxBackend {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(BufReader::new(file))
            .map_err(|e| BackendError::OpenError(format!("not a zip package: {e}")))?;

        let entry = archive.by_name(DOCUMENT_PART).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => {
                BackendError::OpenError(format!("missing {DOCUMENT_PART}"))
            }
            other => BackendError::ExtractionError(other.to_string()),
        })?;

        let body = parse_document_xml(BufReader::new(entry));
        if body.truncated {
            tracing::warn!(
                path = %path.display(),
                recovered = body.paragraphs.len(),
                "document body was truncated"
            );
        }

        Ok(body.paragraphs.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_docx_format() {
        assert_eq!(DocxBackend::new().format(), DocumentFormat::Docx);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DocxBackend::new().extract_text(&dir.path().join("absent.docx"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn non_zip_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, b"plain text pretending to be a docx").unwrap();
        let result = DocxBackend::new().extract_text(&path);
        assert!(matches!(result, Err(BackendError::OpenError(_))));
    }
}
