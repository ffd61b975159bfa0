//! Candidate name extraction from the top of a résumé.
//!
//! Three tiers are tried in order over the leading lines only:
//! explicit patterns, PERSON entities from the model, then a line heuristic.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::ner::{EntityLabel, NlpModel};

/// `Name: Jane Doe` style label followed by 2-4 capitalized words.
static NAME_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b(?i:name)\b[ \t]*[:\-]?[ \t]*({NAME_WORDS})")).unwrap()
});

/// The text opens with a line of 2-4 capitalized words.
static NAME_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?m)\A\s*({NAME_WORDS})[ \t]*$")).unwrap());

/// The text opens with 2-4 capitalized words and a comma (`Jane Doe, MBA`).
static NAME_BEFORE_COMMA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\A\s*({NAME_WORDS})[ \t]*,")).unwrap());

/// 2-4 words on one line, each starting uppercase (`Jane`, `JANE`, `A.`).
const NAME_WORDS: &str = r"[A-Z](?:[A-Za-z]+|\.)(?:[ \t]+[A-Z](?:[A-Za-z]+|\.)){1,3}";

pub(crate) const DEFAULT_SKIP_MARKERS: &[&str] = &[
    "resume",
    "cv",
    "curriculum",
    "vitae",
    "@",
    "email",
    "phone",
    "address",
    "http",
    "www",
];

fn default_name_patterns() -> Vec<Regex> {
    vec![
        NAME_LABEL_RE.clone(),
        NAME_LINE_RE.clone(),
        NAME_BEFORE_COMMA_RE.clone(),
    ]
}

/// Extract the candidate's name, or `None` if every tier fails.
pub fn extract_name(text: &str, model: &NlpModel) -> Option<String> {
    extract_name_with_config(text, model, &ParsingConfig::default())
}

/// Config-aware version of [`extract_name`].
pub fn extract_name_with_config(
    text: &str,
    model: &NlpModel,
    config: &ParsingConfig,
) -> Option<String> {
    let head = leading_lines(text, config.name_scan_lines);

    let defaults: Vec<String> = DEFAULT_SKIP_MARKERS.iter().map(|s| s.to_string()).collect();
    let markers = config.name_skip_markers.resolve(&defaults);

    if let Some(name) = name_from_patterns(&head, config, &markers) {
        tracing::debug!(name = %name, "name found by pattern");
        return Some(name);
    }
    if let Some(name) = name_from_entities(&head, model) {
        tracing::debug!(name = %name, "name found by entity model");
        return Some(name);
    }
    if let Some(name) = name_from_lines(&head, &markers) {
        tracing::debug!(name = %name, "name found by line heuristic");
        return Some(name);
    }

    tracing::debug!("no name found");
    None
}

fn leading_lines(text: &str, n: usize) -> String {
    text.split('\n').take(n).collect::<Vec<_>>().join("\n")
}

/// Tier 1: first pattern hit with at least two words and no skip marker.
fn name_from_patterns(head: &str, config: &ParsingConfig, markers: &[String]) -> Option<String> {
    let patterns = config.name_patterns.resolve(&default_name_patterns());
    patterns.iter().find_map(|re| {
        re.captures_iter(head).find_map(|caps| {
            let m = caps.get(1).or_else(|| caps.get(0))?;
            let candidate = m.as_str().trim();
            (candidate.split_whitespace().count() >= 2 && !has_marker(candidate, markers))
                .then(|| collapse_spaces(candidate))
        })
    })
}

/// Tier 2: first PERSON entity with at least two words.
fn name_from_entities(head: &str, model: &NlpModel) -> Option<String> {
    model
        .entities(head)
        .into_iter()
        .filter(|e| e.label == EntityLabel::Person)
        .map(|e| e.text.trim().to_string())
        .find(|name| name.split_whitespace().count() >= 2)
}

/// Tier 3: a line of 2-4 alphabetic words, each starting uppercase, that
/// carries none of the skip markers.
fn name_from_lines(head: &str, markers: &[String]) -> Option<String> {
    head.split('\n').map(str::trim).find_map(|line| {
        if has_marker(line, markers) {
            return None;
        }

        let words: Vec<&str> = line
            .split_whitespace()
            .filter(|w| w.chars().all(char::is_alphabetic))
            .collect();

        let capitalized = words
            .iter()
            .all(|w| w.chars().next().is_some_and(char::is_uppercase));

        ((2..=4).contains(&words.len()) && capitalized).then(|| words.join(" "))
    })
}

fn has_marker(s: &str, markers: &[String]) -> bool {
    let lower = s.to_lowercase();
    markers.iter().any(|m| lower.contains(m.as_str()))
}

fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
