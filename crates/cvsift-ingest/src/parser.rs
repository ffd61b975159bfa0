use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use cvsift_core::config_file::ConfigFile;
use cvsift_core::{DocumentFormat, ExtractedText, ParseResult, TextBackend};
use cvsift_parsing::{
    NlpModel, ParsingConfigBuilder, ResumeExtractor, ResumeFields, SkillTaxonomy,
};

use crate::ParseError;

/// Typed outcome of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeAnalysis {
    pub format: DocumentFormat,
    pub fields: ResumeFields,
}

impl ResumeAnalysis {
    pub fn into_parse_result(self) -> ParseResult {
        self.fields.into_parse_result()
    }
}

/// Process-wide parsing handle: text backends plus the extractor with its
/// taxonomy and entity model.
///
/// Built once, then shared by reference. Every method takes `&self` and each
/// call owns its intermediate state, so one handle serves many threads.
pub struct ResumeParser {
    extractor: ResumeExtractor,
    backends: Vec<Box<dyn TextBackend>>,
}

impl Default for ResumeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResumeParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumeParser")
            .field("extractor", &self.extractor)
            .field(
                "formats",
                &self.backends.iter().map(|b| b.format()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ResumeParser {
    /// Built-in config and taxonomy, no entity model.
    pub fn new() -> Self {
        Self::with_extractor(ResumeExtractor::new())
    }

    /// Wrap an existing extractor with the default backends.
    pub fn with_extractor(extractor: ResumeExtractor) -> Self {
        Self {
            extractor,
            backends: default_backends(),
        }
    }

    /// Build a parser from an on-disk config.
    ///
    /// The entity model comes from `[model] bert_dir`, then
    /// `[model] patterns_path`, unless `[model] disabled` is set. A model that
    /// fails to load leaves the parser running with the next one, or none.
    pub fn init(config: &ConfigFile) -> Result<Self, regex::Error> {
        let mut builder = ParsingConfigBuilder::new();
        if let Some(extraction) = &config.extraction {
            builder = builder.extraction(extraction);
        }
        let parsing_config = builder.build()?;

        let taxonomy = match &config.taxonomy {
            Some(t) => SkillTaxonomy::with_extensions(t),
            None => SkillTaxonomy::builtin(),
        };

        let model = if config.model_disabled() {
            NlpModel::Blank
        } else {
            NlpModel::load_configured(
                config.model_bert_dir().as_deref(),
                config.model_patterns_path().as_deref(),
            )
        };

        Ok(Self::with_extractor(ResumeExtractor::with_parts(
            parsing_config,
            taxonomy,
            model,
        )))
    }

    /// Replace the entity model.
    pub fn with_model(mut self, model: NlpModel) -> Self {
        self.extractor = self.extractor.with_model(model);
        self
    }

    /// Install a backend, replacing any existing one for the same format.
    pub fn with_backend(mut self, backend: Box<dyn TextBackend>) -> Self {
        let format = backend.format();
        self.backends.retain(|b| b.format() != format);
        self.backends.push(backend);
        self
    }

    pub fn extractor(&self) -> &ResumeExtractor {
        &self.extractor
    }

    pub fn supports(&self, format: DocumentFormat) -> bool {
        self.backend(format).is_some()
    }

    fn backend(&self, format: DocumentFormat) -> Option<&dyn TextBackend> {
        self.backends
            .iter()
            .find(|b| b.format() == format)
            .map(|b| b.as_ref())
    }

    /// Extract raw text from `path` as `format`.
    ///
    /// Never fails: backend errors are logged and yield an empty string, as
    /// does a format with no installed backend.
    pub fn extract_text(&self, path: &Path, format: DocumentFormat) -> String {
        let Some(backend) = self.backend(format) else {
            tracing::warn!(%format, "no backend installed for format");
            return String::new();
        };
        match backend.extract_text(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %path.display(), %format, error = %e, "text extraction failed");
                String::new()
            }
        }
    }

    /// Parse the file at `path`, dispatching on its extension.
    pub fn analyze(&self, path: &Path) -> Result<ResumeAnalysis, ParseError> {
        self.analyze_as(path, DocumentFormat::from_path(path))
    }

    /// Parse the file at `path`, dispatching on `original_filename`'s extension.
    pub fn analyze_upload(
        &self,
        path: &Path,
        original_filename: &str,
    ) -> Result<ResumeAnalysis, ParseError> {
        self.analyze_as(path, DocumentFormat::from_path(Path::new(original_filename)))
    }

    fn analyze_as(
        &self,
        path: &Path,
        format: Option<DocumentFormat>,
    ) -> Result<ResumeAnalysis, ParseError> {
        let format = format.ok_or(ParseError::UnsupportedFormat)?;
        if !self.supports(format) {
            return Err(ParseError::NoBackend(format));
        }

        let raw = self.extract_text(path, format);
        let text = ExtractedText::new(raw).ok_or(ParseError::EmptyExtraction)?;
        let fields = self.extractor.extract_fields(&text);

        Ok(ResumeAnalysis { format, fields })
    }

    /// [`analyze`](Self::analyze) (or [`analyze_upload`](Self::analyze_upload)
    /// when `original_filename` is given) with panics converted to
    /// [`ParseError::Internal`].
    pub fn analyze_guarded(
        &self,
        path: &Path,
        original_filename: Option<&str>,
    ) -> Result<ResumeAnalysis, ParseError> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match original_filename {
            Some(name) => self.analyze_upload(path, name),
            None => self.analyze(path),
        }));

        match outcome {
            Ok(result) => result,
            Err(payload) => {
                let cause = panic_message(payload.as_ref());
                tracing::error!(path = %path.display(), %cause, "panic while parsing resume");
                Err(ParseError::Internal(cause))
            }
        }
    }

    /// Parse the file at `path` into the caller-facing record.
    pub fn parse_resume_file(&self, path: &Path) -> ParseResult {
        into_record(path, self.analyze_guarded(path, None))
    }

    /// Parse an uploaded file whose format is given by `original_filename`.
    pub fn parse_upload(&self, path: &Path, original_filename: &str) -> ParseResult {
        into_record(path, self.analyze_guarded(path, Some(original_filename)))
    }
}

fn default_backends() -> Vec<Box<dyn TextBackend>> {
    let mut backends: Vec<Box<dyn TextBackend>> = vec![Box::new(cvsift_docx::DocxBackend::new())];
    #[cfg(feature = "pdf")]
    backends.push(Box::new(cvsift_pdf_mupdf::MupdfBackend::new()));
    backends
}

fn into_record(path: &Path, outcome: Result<ResumeAnalysis, ParseError>) -> ParseResult {
    match outcome {
        Ok(analysis) => {
            tracing::debug!(
                path = %path.display(),
                format = %analysis.format,
                skills = analysis.fields.skills.len(),
                "resume parsed"
            );
            analysis.into_parse_result()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "resume parse failed");
            ParseResult::failure(e)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal error".to_string()
    }
}
