//! Hybrid skill detection: a rule-based pass over the taxonomy, an entity
//! pass over the model's SKILL spans, and the merge that collapses both into
//! one de-duplicated set per category.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::ParsingConfig;
use crate::ner::{EntityLabel, NlpModel};
use crate::taxonomy::{SkillCategory, SkillTaxonomy};
use crate::text_processing::{clean_text, truncate_chars};

/// Raw per-category hits from one detector, before normalization.
///
/// Insertion is case-insensitively de-duplicated; the first spelling wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillMatches {
    categories: BTreeMap<SkillCategory, Vec<String>>,
}

impl SkillMatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `skill` under `category`. Returns `false` if an equal skill
    /// (ignoring case) was already present.
    pub fn insert(&mut self, category: SkillCategory, skill: impl Into<String>) -> bool {
        let skill = skill.into();
        let key = skill.to_lowercase();
        let entries = self.categories.entry(category).or_default();
        if entries.iter().any(|s| s.to_lowercase() == key) {
            return false;
        }
        entries.push(skill);
        true
    }

    /// Union `other` into `self`, category by category.
    pub fn extend(&mut self, other: SkillMatches) {
        for (category, skills) in other.categories {
            for skill in skills {
                self.insert(category, skill);
            }
        }
    }

    pub fn get(&self, category: SkillCategory) -> &[String] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(Vec::is_empty)
    }
}

/// Final per-category skills: no empty categories, no entry that is a strict
/// substring of another in its category, each category sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedSkills {
    categories: BTreeMap<SkillCategory, Vec<String>>,
}

impl ExtractedSkills {
    pub fn get(&self, category: SkillCategory) -> &[String] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Categories in display order, with their skills.
    pub fn iter(&self) -> impl Iterator<Item = (SkillCategory, &[String])> {
        self.categories.iter().map(|(c, s)| (*c, s.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of skills across categories.
    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

/// Rule-based detector.
///
/// Abbreviations found as whole words contribute their full form when it
/// names a canonical skill. Every canonical skill is then looked up in the
/// lowercased text as-is and with its spaces turned into `-`, `_` or nothing.
pub fn extract_skills_rule_based(text: &str, taxonomy: &SkillTaxonomy) -> SkillMatches {
    let mut matches = SkillMatches::new();

    for abbreviation in taxonomy.abbreviations() {
        if !abbreviation.occurs_in(text) {
            continue;
        }
        if let Some(category) = taxonomy.category_of(&abbreviation.full) {
            matches.insert(category, abbreviation.full.clone());
        }
    }

    let lower = text.to_lowercase();
    for (category, skills) in taxonomy.categories() {
        for skill in skills {
            let variants = [
                skill.clone(),
                skill.replace(' ', "-"),
                skill.replace(' ', "_"),
                skill.replace(' ', ""),
            ];
            if variants.iter().any(|v| lower.contains(v.as_str())) {
                matches.insert(category, skill.clone());
            }
        }
    }

    matches
}

/// Entity-based detector.
///
/// Each SKILL entity is stripped of non-ASCII characters and filed under
/// every category whose canonical skills overlap it by substring in either
/// direction, or under [`SkillCategory::Other`] if none do. A blank model
/// contributes nothing.
pub fn extract_skills_ner(text: &str, taxonomy: &SkillTaxonomy, model: &NlpModel) -> SkillMatches {
    let mut matches = SkillMatches::new();
    if !model.is_available() {
        return matches;
    }

    for entity in model.entities(text) {
        if entity.label != EntityLabel::Skill {
            continue;
        }
        let cleaned = clean_text(&entity.text);
        let skill = cleaned.trim();
        if skill.is_empty() {
            continue;
        }

        let skill_lower = skill.to_lowercase();
        let mut filed = false;
        for (category, canonical) in taxonomy.categories() {
            let overlaps = canonical
                .iter()
                .any(|s| skill_lower.contains(s.as_str()) || s.contains(skill_lower.as_str()));
            if overlaps {
                matches.insert(category, skill);
                filed = true;
            }
        }
        if !filed {
            matches.insert(SkillCategory::Other, skill);
        }
    }

    matches
}

/// Union both detectors and normalize each category.
///
/// Per category: longest skills first, a skill is dropped if it is a strict
/// substring of one already kept, then the survivors are sorted. Empty
/// categories are removed.
pub fn merge_and_normalize(rule_based: SkillMatches, ner: SkillMatches) -> ExtractedSkills {
    let mut union = rule_based;
    union.extend(ner);

    let mut categories = BTreeMap::new();
    for (category, mut skills) in union.categories {
        skills.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        let mut kept: Vec<String> = Vec::with_capacity(skills.len());
        for skill in skills {
            if !kept.iter().any(|k| k != &skill && k.contains(skill.as_str())) {
                kept.push(skill);
            }
        }

        if !kept.is_empty() {
            kept.sort();
            categories.insert(category, kept);
        }
    }

    ExtractedSkills { categories }
}

/// Run both detectors over `text` and merge the results.
pub fn extract_skills(text: &str, taxonomy: &SkillTaxonomy, model: &NlpModel) -> ExtractedSkills {
    extract_skills_with_config(text, taxonomy, model, &ParsingConfig::default())
}

/// Config-aware version of [`extract_skills`].
pub fn extract_skills_with_config(
    text: &str,
    taxonomy: &SkillTaxonomy,
    model: &NlpModel,
    config: &ParsingConfig,
) -> ExtractedSkills {
    let text = truncate_chars(text, config.skill_text_limit);

    let rule_based = extract_skills_rule_based(text, taxonomy);
    let ner = extract_skills_ner(text, taxonomy, model);
    let skills = merge_and_normalize(rule_based, ner);

    if skills.is_empty() {
        tracing::debug!("no skills detected");
    } else {
        tracing::debug!(
            categories = skills.categories.len(),
            skills = skills.len(),
            "skills detected"
        );
    }
    skills
}

/// Flatten skills into one comma-separated string, category by category.
pub fn format_skills_for_display(skills: &ExtractedSkills) -> String {
    skills
        .iter()
        .flat_map(|(_, list)| list.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(", ")
}
