use std::path::Path;

use thiserror::Error;

mod parser;

// Re-export domain types for convenience
pub use cvsift_core::{DocumentFormat, ExtractedText, ParseResult};
pub use cvsift_parsing::{ExtractedSkills, ResumeFields, SkillCategory};
pub use parser::{ResumeAnalysis, ResumeParser};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Unsupported file format. Please upload PDF or DOCX")]
    UnsupportedFormat,
    #[error("No text could be extracted from the file")]
    EmptyExtraction,
    #[error("{0} support not compiled in (enable the `pdf` feature of cvsift-ingest)")]
    NoBackend(DocumentFormat),
    #[error("{0}")]
    Internal(String),
}

/// Parse a résumé with built-in defaults and no entity model.
///
/// The format is taken from `path`'s extension. Never panics; every failure
/// comes back as an unsuccessful [`ParseResult`].
pub fn parse_resume_file(path: &Path) -> ParseResult {
    ResumeParser::new().parse_resume_file(path)
}

/// Like [`parse_resume_file`], but the format comes from the name the file
/// was uploaded under rather than from the stored path.
pub fn parse_upload(path: &Path, original_filename: &str) -> ParseResult {
    ResumeParser::new().parse_upload(path, original_filename)
}
