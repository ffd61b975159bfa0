//! Information extraction over normalized résumé text: name, email, phone and
//! categorized skills.
//!
//! The free functions use built-in defaults; [`ResumeExtractor`] bundles a
//! [`ParsingConfig`], a [`SkillTaxonomy`] and an [`NlpModel`] for repeated use.

#[cfg(feature = "bert")]
pub mod bert;
pub mod config;
pub mod contact;
pub mod extractor;
pub mod name;
pub mod ner;
pub mod skills;
pub mod tagging;
pub mod taxonomy;
pub mod text_processing;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use contact::{extract_email, extract_email_with_config, extract_phone};
pub use extractor::{ResumeExtractor, ResumeFields};
pub use name::{extract_name, extract_name_with_config};
pub use ner::{Entity, EntityLabel, EntityRecognizer, ModelError, NlpModel, PatternModel};
pub use skills::{
    ExtractedSkills, SkillMatches, extract_skills, extract_skills_ner, extract_skills_rule_based,
    extract_skills_with_config, format_skills_for_display, merge_and_normalize,
};
#[cfg(feature = "bert")]
pub use bert::BertEntityModel;
pub use tagging::{TaggedToken, chunk_lines, decode_bio};
pub use taxonomy::{Abbreviation, SkillCategory, SkillTaxonomy};
