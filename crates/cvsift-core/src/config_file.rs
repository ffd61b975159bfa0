use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub model: Option<ModelConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub taxonomy: Option<TaxonomyConfig>,
}

/// Entity model artifact settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to a JSON Lines entity-pattern file.
    pub patterns_path: Option<String>,
    /// Directory of a BERT token-classification model. Takes precedence
    /// over `patterns_path` when it loads.
    pub bert_dir: Option<String>,
    /// Run without an entity model even if one is configured.
    pub disabled: Option<bool>,
}

/// Heuristic tuning knobs for the field and skill extractors.
///
/// List settings come in pairs: the plain key replaces the built-in list,
/// the `extra_` key appends to whichever list is in effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub name_scan_lines: Option<usize>,
    pub skill_text_limit: Option<usize>,
    pub email_context_lines: Option<usize>,
    /// Regexes for the first name tier; capture group 1 is the name.
    pub name_patterns: Option<Vec<String>>,
    pub extra_name_patterns: Option<Vec<String>>,
    /// Substrings that disqualify a line as a name (case-insensitive).
    pub name_skip_markers: Option<Vec<String>>,
    pub extra_name_skip_markers: Option<Vec<String>>,
    /// Keywords that mark a line as likely to hold an email.
    pub email_keywords: Option<Vec<String>>,
    pub extra_email_keywords: Option<Vec<String>>,
}

/// Additions to the built-in skill vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    /// Category display name (e.g. `"Databases"`) → extra canonical skills.
    pub extra_skills: Option<BTreeMap<String, Vec<String>>>,
    /// Abbreviation → full form.
    pub extra_abbreviations: Option<BTreeMap<String, String>>,
}

impl ConfigFile {
    pub fn model_patterns_path(&self) -> Option<PathBuf> {
        self.model
            .as_ref()
            .and_then(|m| m.patterns_path.as_ref())
            .map(PathBuf::from)
    }

    pub fn model_bert_dir(&self) -> Option<PathBuf> {
        self.model
            .as_ref()
            .and_then(|m| m.bert_dir.as_ref())
            .map(PathBuf::from)
    }

    pub fn model_disabled(&self) -> bool {
        self.model
            .as_ref()
            .and_then(|m| m.disabled)
            .unwrap_or(false)
    }
}

/// Platform config directory path: `<config_dir>/cvsift/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cvsift").join("config.toml"))
}

/// Load config by cascading CWD `.cvsift.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".cvsift.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        model: Some(ModelConfig {
            patterns_path: overlay
                .model
                .as_ref()
                .and_then(|m| m.patterns_path.clone())
                .or_else(|| base.model.as_ref().and_then(|m| m.patterns_path.clone())),
            bert_dir: overlay
                .model
                .as_ref()
                .and_then(|m| m.bert_dir.clone())
                .or_else(|| base.model.as_ref().and_then(|m| m.bert_dir.clone())),
            disabled: overlay
                .model
                .as_ref()
                .and_then(|m| m.disabled)
                .or_else(|| base.model.as_ref().and_then(|m| m.disabled)),
        }),
        extraction: Some(merge_extraction(
            base.extraction.unwrap_or_default(),
            overlay.extraction.unwrap_or_default(),
        )),
        taxonomy: Some(TaxonomyConfig {
            extra_skills: overlay
                .taxonomy
                .as_ref()
                .and_then(|t| t.extra_skills.clone())
                .or_else(|| base.taxonomy.as_ref().and_then(|t| t.extra_skills.clone())),
            extra_abbreviations: overlay
                .taxonomy
                .as_ref()
                .and_then(|t| t.extra_abbreviations.clone())
                .or_else(|| {
                    base.taxonomy
                        .as_ref()
                        .and_then(|t| t.extra_abbreviations.clone())
                }),
        }),
    }
}

fn merge_extraction(base: ExtractionConfig, overlay: ExtractionConfig) -> ExtractionConfig {
    ExtractionConfig {
        name_scan_lines: overlay.name_scan_lines.or(base.name_scan_lines),
        skill_text_limit: overlay.skill_text_limit.or(base.skill_text_limit),
        email_context_lines: overlay.email_context_lines.or(base.email_context_lines),
        name_patterns: overlay.name_patterns.or(base.name_patterns),
        extra_name_patterns: overlay.extra_name_patterns.or(base.extra_name_patterns),
        name_skip_markers: overlay.name_skip_markers.or(base.name_skip_markers),
        extra_name_skip_markers: overlay
            .extra_name_skip_markers
            .or(base.extra_name_skip_markers),
        email_keywords: overlay.email_keywords.or(base.email_keywords),
        extra_email_keywords: overlay.extra_email_keywords.or(base.extra_email_keywords),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let toml_str = r#"
[model]
patterns_path = "/opt/cvsift/entity_patterns.jsonl"
bert_dir = "/opt/cvsift/bert-resume-ner"

[extraction]
name_scan_lines = 12
skill_text_limit = 50000

[taxonomy.extra_skills]
"Databases" = ["clickhouse", "duckdb"]

[taxonomy.extra_abbreviations]
PG = "PostgreSQL"
"#;
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(
            parsed.model_patterns_path(),
            Some(PathBuf::from("/opt/cvsift/entity_patterns.jsonl"))
        );
        assert_eq!(
            parsed.model_bert_dir(),
            Some(PathBuf::from("/opt/cvsift/bert-resume-ner"))
        );
        let extraction = parsed.extraction.unwrap();
        assert_eq!(extraction.name_scan_lines, Some(12));
        assert_eq!(extraction.email_context_lines, None);
        let taxonomy = parsed.taxonomy.unwrap();
        assert_eq!(
            taxonomy.extra_skills.unwrap()["Databases"],
            vec!["clickhouse".to_string(), "duckdb".to_string()]
        );
        assert_eq!(taxonomy.extra_abbreviations.unwrap()["PG"], "PostgreSQL");
    }

    #[test]
    fn model_disabled_defaults_to_false() {
        assert!(!ConfigFile::default().model_disabled());
        let parsed: ConfigFile = toml::from_str("[model]\ndisabled = true\n").unwrap();
        assert!(parsed.model_disabled());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            extraction: Some(ExtractionConfig {
                name_scan_lines: Some(8),
                skill_text_limit: Some(1000),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            extraction: Some(ExtractionConfig {
                name_scan_lines: Some(15),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).extraction.unwrap();
        assert_eq!(merged.name_scan_lines, Some(15));
        assert_eq!(merged.skill_text_limit, Some(1000));
    }

    #[test]
    fn extraction_lists_parse_and_merge() {
        let base: ConfigFile = toml::from_str(
            r#"
[extraction]
name_skip_markers = ["resume", "portfolio"]
extra_email_keywords = ["contact"]
"#,
        )
        .unwrap();
        let overlay: ConfigFile = toml::from_str(
            r#"
[extraction]
extra_name_patterns = ['(?m)^Candidate:\s*(.+)$']
extra_email_keywords = ["reach me"]
"#,
        )
        .unwrap();

        let merged = merge(base, overlay).extraction.unwrap();
        assert_eq!(
            merged.name_skip_markers,
            Some(vec!["resume".to_string(), "portfolio".to_string()])
        );
        assert_eq!(
            merged.extra_name_patterns,
            Some(vec![r"(?m)^Candidate:\s*(.+)$".to_string()])
        );
        assert_eq!(merged.extra_email_keywords, Some(vec!["reach me".to_string()]));
        assert_eq!(merged.email_keywords, None);
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            model: Some(ModelConfig {
                patterns_path: Some("/base/patterns.jsonl".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(
            merged.model_patterns_path(),
            Some(PathBuf::from("/base/patterns.jsonl"))
        );
    }

    #[test]
    fn load_from_path_ignores_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("missing.toml")).is_none());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[model\npatterns_path = ").unwrap();
        assert!(load_from_path(&bad).is_none());

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[extraction]\nemail_context_lines = 4\n").unwrap();
        let config = load_from_path(&good).unwrap();
        assert_eq!(config.extraction.unwrap().email_context_lines, Some(4));
    }
}
