use std::path::Path;

use mupdf::{Document, Page, TextPageFlags};

use cvsift_core::{BackendError, DocumentFormat, TextBackend, normalize_pdf_text};

/// MuPDF-based implementation of [`TextBackend`] for PDF résumés.
///
/// This crate isolates the mupdf dependency (AGPL-3.0) so that non-PDF code
/// paths do not transitively depend on it.
///
/// Pages are read independently: a page that fails to load or yield a text
/// layer is logged and contributes nothing, the rest of the document is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TextBackend for MupdfBackend {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let pages = document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let mut pages_text = Vec::new();
        let mut failed_pages = 0usize;

        for (index, page_result) in pages.enumerate() {
            let text = page_result
                .map_err(|e| e.to_string())
                .and_then(|page| page_text(&page).map_err(|e| e.to_string()));
            match text {
                Ok(text) => pages_text.push(text),
                Err(error) => {
                    failed_pages += 1;
                    tracing::warn!(path = %path.display(), page = index + 1, %error, "skipping unreadable PDF page");
                }
            }
        }

        if failed_pages > 0 {
            tracing::debug!(
                path = %path.display(),
                recovered = pages_text.len(),
                failed = failed_pages,
                "partial PDF extraction"
            );
        }

        Ok(normalize_pdf_text(&pages_text.join("\n")))
    }
}

/// Read one page's text layer, block by block and line by line.
fn page_text(page: &Page) -> Result<String, mupdf::Error> {
    let text_page = page.to_text_page(TextPageFlags::empty())?;

    let mut text = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            let line_text: String = line
                .chars()
                .map(|c| c.char().unwrap_or('\u{FFFD}'))
                .collect();
            text.push_str(&line_text);
            text.push('\n');
        }
    }
    Ok(text)
}
