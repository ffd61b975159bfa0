use regex::Regex;

use cvsift_core::config_file::ExtractionConfig;

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

pub(crate) const DEFAULT_NAME_SCAN_LINES: usize = 10;
pub(crate) const DEFAULT_SKILL_TEXT_LIMIT: usize = 100_000;
pub(crate) const DEFAULT_EMAIL_CONTEXT_LINES: usize = 3;

/// Configuration for the field and skill extractors.
///
/// Regex lists left at [`ListOverride::Default`] use the built-in patterns.
/// Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── name.rs ──
    /// Patterns tried in order by the first name tier. Capture group 1 is the
    /// candidate when present, otherwise the whole match.
    pub(crate) name_patterns: ListOverride<Regex>,
    /// Lowercase markers that disqualify a line in the line-heuristic tier.
    pub(crate) name_skip_markers: ListOverride<String>,
    /// How many leading lines of the text are searched for a name.
    pub(crate) name_scan_lines: usize,

    // ── contact.rs ──
    /// Lowercase keywords that mark a line as likely to hold an email.
    pub(crate) email_keywords: ListOverride<String>,
    /// Lines searched per keyword hit, counting the keyword line itself.
    pub(crate) email_context_lines: usize,

    // ── skills.rs ──
    /// Maximum number of characters handed to the skill detectors.
    pub(crate) skill_text_limit: usize,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            name_patterns: ListOverride::Default,
            name_skip_markers: ListOverride::Default,
            name_scan_lines: DEFAULT_NAME_SCAN_LINES,
            email_keywords: ListOverride::Default,
            email_context_lines: DEFAULT_EMAIL_CONTEXT_LINES,
            skill_text_limit: DEFAULT_SKILL_TEXT_LIMIT,
        }
    }
}

impl ParsingConfig {
    pub fn name_scan_lines(&self) -> usize {
        self.name_scan_lines
    }

    pub fn email_context_lines(&self) -> usize {
        self.email_context_lines
    }

    pub fn skill_text_limit(&self) -> usize {
        self.skill_text_limit
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    name_patterns: ListOverrideBuilder,
    name_skip_markers: ListOverride<String>,
    name_scan_lines: Option<usize>,
    email_keywords: ListOverride<String>,
    email_context_lines: Option<usize>,
    skill_text_limit: Option<usize>,
}

/// Helper for building `ListOverride<Regex>` from string patterns.
#[derive(Debug, Clone, Default)]
enum ListOverrideBuilder {
    #[default]
    Default,
    Replace(Vec<String>),
    Extend(Vec<String>),
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the `[extraction]` section of an on-disk config. Unset fields
    /// leave the builder untouched.
    pub fn extraction(mut self, extraction: &ExtractionConfig) -> Self {
        if let Some(n) = extraction.name_scan_lines {
            self.name_scan_lines = Some(n);
        }
        if let Some(n) = extraction.skill_text_limit {
            self.skill_text_limit = Some(n);
        }
        if let Some(n) = extraction.email_context_lines {
            self.email_context_lines = Some(n);
        }

        if let Some(patterns) = &extraction.name_patterns {
            self = self.set_name_patterns(patterns.clone());
        }
        for pattern in extraction.extra_name_patterns.iter().flatten() {
            self = self.add_name_pattern(pattern.clone());
        }
        if let Some(markers) = &extraction.name_skip_markers {
            self = self.set_name_skip_markers(markers.clone());
        }
        for marker in extraction.extra_name_skip_markers.iter().flatten() {
            self = self.add_name_skip_marker(marker.clone());
        }
        if let Some(keywords) = &extraction.email_keywords {
            self = self.set_email_keywords(keywords.clone());
        }
        for keyword in extraction.extra_email_keywords.iter().flatten() {
            self = self.add_email_keyword(keyword.clone());
        }
        self
    }

    // ── Name ──

    pub fn set_name_patterns(mut self, patterns: Vec<String>) -> Self {
        self.name_patterns = ListOverrideBuilder::Replace(patterns);
        self
    }

    pub fn add_name_pattern(mut self, pattern: String) -> Self {
        match &mut self.name_patterns {
            ListOverrideBuilder::Replace(v) | ListOverrideBuilder::Extend(v) => v.push(pattern),
            ListOverrideBuilder::Default => {
                self.name_patterns = ListOverrideBuilder::Extend(vec![pattern])
            }
        }
        self
    }

    pub fn set_name_skip_markers(mut self, markers: Vec<String>) -> Self {
        self.name_skip_markers = ListOverride::Replace(markers);
        self
    }

    pub fn add_name_skip_marker(mut self, marker: String) -> Self {
        match &mut self.name_skip_markers {
            ListOverride::Replace(v) | ListOverride::Extend(v) => v.push(marker),
            ListOverride::Default => self.name_skip_markers = ListOverride::Extend(vec![marker]),
        }
        self
    }

    pub fn name_scan_lines(mut self, n: usize) -> Self {
        self.name_scan_lines = Some(n);
        self
    }

    // ── Email ──

    pub fn set_email_keywords(mut self, keywords: Vec<String>) -> Self {
        self.email_keywords = ListOverride::Replace(keywords);
        self
    }

    pub fn add_email_keyword(mut self, keyword: String) -> Self {
        match &mut self.email_keywords {
            ListOverride::Replace(v) | ListOverride::Extend(v) => v.push(keyword),
            ListOverride::Default => self.email_keywords = ListOverride::Extend(vec![keyword]),
        }
        self
    }

    pub fn email_context_lines(mut self, n: usize) -> Self {
        self.email_context_lines = Some(n);
        self
    }

    // ── Skills ──

    pub fn skill_text_limit(mut self, n: usize) -> Self {
        self.skill_text_limit = Some(n);
        self
    }

    /// Compile all string patterns into regexes and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let compile_list =
            |builder: ListOverrideBuilder| -> Result<ListOverride<Regex>, regex::Error> {
                match builder {
                    ListOverrideBuilder::Default => Ok(ListOverride::Default),
                    ListOverrideBuilder::Replace(patterns) => {
                        let regexes: Result<Vec<_>, _> =
                            patterns.iter().map(|p| Regex::new(p)).collect();
                        Ok(ListOverride::Replace(regexes?))
                    }
                    ListOverrideBuilder::Extend(patterns) => {
                        let regexes: Result<Vec<_>, _> =
                            patterns.iter().map(|p| Regex::new(p)).collect();
                        Ok(ListOverride::Extend(regexes?))
                    }
                }
            };

        let lowercase = |list: ListOverride<String>| match list {
            ListOverride::Default => ListOverride::Default,
            ListOverride::Replace(v) => {
                ListOverride::Replace(v.into_iter().map(|s| s.to_lowercase()).collect())
            }
            ListOverride::Extend(v) => {
                ListOverride::Extend(v.into_iter().map(|s| s.to_lowercase()).collect())
            }
        };

        Ok(ParsingConfig {
            name_patterns: compile_list(self.name_patterns)?,
            name_skip_markers: lowercase(self.name_skip_markers),
            name_scan_lines: self.name_scan_lines.unwrap_or(DEFAULT_NAME_SCAN_LINES),
            email_keywords: lowercase(self.email_keywords),
            email_context_lines: self
                .email_context_lines
                .unwrap_or(DEFAULT_EMAIL_CONTEXT_LINES)
                .max(1),
            skill_text_limit: self.skill_text_limit.unwrap_or(DEFAULT_SKILL_TEXT_LIMIT),
        })
    }
}
