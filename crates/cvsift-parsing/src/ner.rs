//! Entity recognition: the [`EntityRecognizer`] seam, a pattern-file backed
//! recognizer, and the [`NlpModel`] availability wrapper.

use std::collections::BTreeMap;
use std::fmt;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

/// Entity label as assigned by a recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    Person,
    Skill,
    Other(String),
}

impl EntityLabel {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "PERSON" => EntityLabel::Person,
            "SKILL" => EntityLabel::Skill,
            other => EntityLabel::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityLabel::Person => f.write_str("PERSON"),
            EntityLabel::Skill => f.write_str("SKILL"),
            EntityLabel::Other(label) => f.write_str(label),
        }
    }
}

/// A labelled span of the input text. `start`/`end` are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

/// Anything that can label spans of text.
pub trait EntityRecognizer: Send + Sync {
    /// Entities found in `text`, ordered by start offset.
    fn recognize(&self, text: &str) -> Vec<Entity>;
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: invalid JSON: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
    #[error("line {line}: {reason}")]
    InvalidPattern { line: usize, reason: String },
    #[error("line {line}: {source}")]
    Regex { line: usize, source: regex::Error },
    #[error("model file contains no patterns")]
    Empty,
    #[error("invalid model config {path}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid label map in {path}: {reason}")]
    Labels { path: PathBuf, reason: String },
    #[error("tokenizer: {0}")]
    Tokenizer(String),
    #[cfg(feature = "bert")]
    #[error(transparent)]
    Candle(#[from] candle_core::Error),
    #[error("{0} support not compiled in (enable the `{0}` feature)")]
    NotCompiled(&'static str),
}

/// One line of a pattern file.
#[derive(Debug, Deserialize)]
struct PatternLine {
    label: String,
    pattern: PatternShape,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PatternShape {
    Phrase(String),
    Tokens(Vec<BTreeMap<String, serde_json::Value>>),
}

#[derive(Debug)]
struct CompiledPattern {
    label: EntityLabel,
    regex: Regex,
}

/// Recognizer driven by a JSON Lines pattern file.
///
/// Each line is either a phrase pattern, matched case-insensitively:
///
/// ```text
/// {"label": "SKILL", "pattern": "spring boot"}
/// ```
///
/// or a token pattern, one object per whitespace-separated token, using the
/// keys `TEXT` (exact), `LOWER` (case-insensitive) or `IS_TITLE`:
///
/// ```text
/// {"label": "PERSON", "pattern": [{"IS_TITLE": true}, {"LOWER": "van"}, {"IS_TITLE": true}]}
/// ```
///
/// Matches are whole-word. Overlapping matches resolve to the longest span,
/// then the earliest.
#[derive(Debug)]
pub struct PatternModel {
    patterns: Vec<CompiledPattern>,
}

impl PatternModel {
    /// Load a pattern file from disk.
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let file = std::fs::File::open(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file)).map_err(|e| match e {
            ModelError::Io { source, .. } => ModelError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse pattern lines from any buffered reader. Blank lines are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, ModelError> {
        let mut patterns = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line.map_err(|source| ModelError::Io {
                path: PathBuf::new(),
                source,
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let parsed: PatternLine = serde_json::from_str(line).map_err(|source| {
                ModelError::Json {
                    line: line_no,
                    source,
                }
            })?;
            patterns.push(compile_pattern(parsed, line_no)?);
        }

        if patterns.is_empty() {
            return Err(ModelError::Empty);
        }
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl EntityRecognizer for PatternModel {
    fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut candidates: Vec<(usize, usize, &EntityLabel)> = self
            .patterns
            .iter()
            .flat_map(|p| {
                p.regex
                    .find_iter(text)
                    .filter(|m| !m.is_empty())
                    .map(move |m| (m.start(), m.end(), &p.label))
            })
            .collect();

        // Longest first, then earliest; keep spans that don't overlap a kept one.
        candidates.sort_by(|a, b| (b.1 - b.0).cmp(&(a.1 - a.0)).then(a.0.cmp(&b.0)));
        let mut kept: Vec<(usize, usize, &EntityLabel)> = Vec::new();
        for candidate in candidates {
            if kept
                .iter()
                .all(|k| candidate.1 <= k.0 || candidate.0 >= k.1)
            {
                kept.push(candidate);
            }
        }
        kept.sort_by_key(|k| k.0);

        kept.into_iter()
            .map(|(start, end, label)| Entity {
                text: text[start..end].to_string(),
                label: label.clone(),
                start,
                end,
            })
            .collect()
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Wrap a fragment in `\b` on each side whose edge character is a word
/// character, so `c++` still matches before a space.
fn bounded(fragment: String, first: Option<char>, last: Option<char>) -> String {
    let mut out = String::new();
    if first.is_some_and(is_word_char) {
        out.push_str(r"\b");
    }
    out.push_str(&fragment);
    if last.is_some_and(is_word_char) {
        out.push_str(r"\b");
    }
    out
}

fn compile_pattern(line: PatternLine, line_no: usize) -> Result<CompiledPattern, ModelError> {
    let label = EntityLabel::parse(&line.label);
    let invalid = |reason: String| ModelError::InvalidPattern {
        line: line_no,
        reason,
    };

    let source = match line.pattern {
        PatternShape::Phrase(phrase) => {
            let words: Vec<&str> = phrase.split_whitespace().collect();
            if words.is_empty() {
                return Err(invalid("empty phrase pattern".into()));
            }
            let body = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join(r"\s+");
            let first = words.first().and_then(|w| w.chars().next());
            let last = words.last().and_then(|w| w.chars().next_back());
            format!("(?i:{})", bounded(body, first, last))
        }
        PatternShape::Tokens(tokens) => {
            if tokens.is_empty() {
                return Err(invalid("empty token pattern".into()));
            }
            let mut parts = Vec::with_capacity(tokens.len());
            for token in &tokens {
                parts.push(compile_token(token).map_err(invalid)?);
            }
            parts.join(r"\s+")
        }
    };

    let regex = Regex::new(&source).map_err(|source| ModelError::Regex {
        line: line_no,
        source,
    })?;
    Ok(CompiledPattern { label, regex })
}

/// Compile one token pattern to a bounded regex fragment.
fn compile_token(token: &BTreeMap<String, serde_json::Value>) -> Result<String, String> {
    if token.len() != 1 {
        return Err(format!("token must have exactly one key, got {}", token.len()));
    }
    let Some((key, value)) = token.iter().next() else {
        return Err("empty token".into());
    };

    match (key.as_str(), value) {
        ("TEXT", serde_json::Value::String(s)) if !s.is_empty() => Ok(bounded(
            regex::escape(s),
            s.chars().next(),
            s.chars().next_back(),
        )),
        ("LOWER", serde_json::Value::String(s)) if !s.is_empty() => Ok(bounded(
            format!("(?i:{})", regex::escape(s)),
            s.chars().next(),
            s.chars().next_back(),
        )),
        ("IS_TITLE", serde_json::Value::Bool(true)) => Ok(r"\b\p{Lu}\p{Ll}+\b".to_string()),
        (key, value) => Err(format!("unsupported token attribute {key}={value}")),
    }
}

/// The entity model as seen by the extractors: either loaded, or blank.
///
/// A blank model recognizes nothing, so every entity-driven step degrades to
/// a no-op rather than an error.
#[derive(Clone, Default)]
pub enum NlpModel {
    Loaded(Arc<dyn EntityRecognizer>),
    #[default]
    Blank,
}

impl fmt::Debug for NlpModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NlpModel::Loaded(_) => f.write_str("NlpModel::Loaded"),
            NlpModel::Blank => f.write_str("NlpModel::Blank"),
        }
    }
}

impl NlpModel {
    /// Load a pattern model from `path`, falling back to [`NlpModel::Blank`]
    /// when no path is given or the file cannot be loaded.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("no entity model configured, running without one");
            return NlpModel::Blank;
        };
        match PatternModel::from_path(path) {
            Ok(model) => {
                tracing::debug!(path = %path.display(), patterns = model.len(), "loaded entity model");
                NlpModel::Loaded(Arc::new(model))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "entity model unavailable, continuing without it");
                NlpModel::Blank
            }
        }
    }

    /// Load the configured model: the token-classification model in
    /// `bert_dir` when one is given and loads, otherwise the pattern file.
    pub fn load_configured(bert_dir: Option<&Path>, patterns: Option<&Path>) -> Self {
        if let Some(dir) = bert_dir {
            match Self::load_bert(dir) {
                Ok(model) => return model,
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "token-classification model unavailable, trying pattern model");
                }
            }
        }
        Self::load(patterns)
    }

    /// Load a BERT token-classification model directory.
    #[cfg(feature = "bert")]
    pub fn load_bert(dir: &Path) -> Result<Self, ModelError> {
        let model = crate::bert::BertEntityModel::from_dir(dir)?;
        Ok(NlpModel::Loaded(Arc::new(model)))
    }

    /// Load a BERT token-classification model directory.
    #[cfg(not(feature = "bert"))]
    pub fn load_bert(_dir: &Path) -> Result<Self, ModelError> {
        Err(ModelError::NotCompiled("bert"))
    }

    pub fn from_recognizer(recognizer: impl EntityRecognizer + 'static) -> Self {
        NlpModel::Loaded(Arc::new(recognizer))
    }

    pub fn is_available(&self) -> bool {
        matches!(self, NlpModel::Loaded(_))
    }

    /// Entities in `text`; always empty for a blank model.
    pub fn entities(&self, text: &str) -> Vec<Entity> {
        match self {
            NlpModel::Loaded(recognizer) => recognizer.recognize(text),
            NlpModel::Blank => Vec::new(),
        }
    }
}
