use serde::Serialize;

use cvsift_core::{ExtractedText, ParseResult};

use crate::config::ParsingConfig;
use crate::ner::NlpModel;
use crate::skills::{ExtractedSkills, format_skills_for_display};
use crate::taxonomy::SkillTaxonomy;
use crate::{contact, name, skills};

/// Structured fields pulled out of one résumé's text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResumeFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub skills: ExtractedSkills,
}

impl ResumeFields {
    /// Skills flattened to the comma-separated display string.
    pub fn skills_display(&self) -> String {
        format_skills_for_display(&self.skills)
    }

    /// Convert into the caller-facing record.
    pub fn into_parse_result(self) -> ParseResult {
        let skills = self.skills_display();
        ParseResult::success(self.name, self.email, self.phone, skills)
    }
}

/// A configurable field and skill extraction pipeline.
///
/// Holds the [`ParsingConfig`], the skill vocabulary and the entity model, and
/// exposes each extractor as a method. Read-only once built, so one instance
/// can serve any number of threads.
#[derive(Debug, Clone, Default)]
pub struct ResumeExtractor {
    config: ParsingConfig,
    taxonomy: SkillTaxonomy,
    model: NlpModel,
}

impl ResumeExtractor {
    /// Create an extractor with the built-in config and taxonomy and no model.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(config: ParsingConfig, taxonomy: SkillTaxonomy, model: NlpModel) -> Self {
        Self {
            config,
            taxonomy,
            model,
        }
    }

    pub fn with_model(mut self, model: NlpModel) -> Self {
        self.model = model;
        self
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    pub fn taxonomy(&self) -> &SkillTaxonomy {
        &self.taxonomy
    }

    pub fn model(&self) -> &NlpModel {
        &self.model
    }

    pub fn extract_name(&self, text: &str) -> Option<String> {
        name::extract_name_with_config(text, &self.model, &self.config)
    }

    pub fn extract_email(&self, text: &str) -> Option<String> {
        contact::extract_email_with_config(text, &self.config)
    }

    pub fn extract_phone(&self, text: &str) -> Option<String> {
        contact::extract_phone(text)
    }

    pub fn extract_skills(&self, text: &str) -> ExtractedSkills {
        skills::extract_skills_with_config(text, &self.taxonomy, &self.model, &self.config)
    }

    /// Run every extractor over `text`.
    pub fn extract_fields(&self, text: &ExtractedText) -> ResumeFields {
        let text = text.as_str();
        ResumeFields {
            name: self.extract_name(text),
            email: self.extract_email(text),
            phone: self.extract_phone(text),
            skills: self.extract_skills(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::SkillCategory;

    const SAMPLE: &str = "Jane Doe\n\
        Senior Backend Engineer\n\
        Email: jane.doe@example.com | Phone: (555) 123-4567\n\
        Skills\n\
        Python, Django, PostgreSQL, Docker, Kubernetes, Git, Agile\n";

    #[test]
    fn test_extract_fields_on_sample() {
        let extractor = ResumeExtractor::new();
        let fields = extractor.extract_fields(&ExtractedText::new(SAMPLE).unwrap());

        assert_eq!(fields.name.as_deref(), Some("Jane Doe"));
        assert_eq!(fields.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(fields.phone.as_deref(), Some("555-123-4567"));
        assert!(fields
            .skills
            .get(SkillCategory::ProgrammingLanguages)
            .contains(&"python".to_string()));
        assert!(fields
            .skills
            .get(SkillCategory::Databases)
            .contains(&"postgresql".to_string()));
        assert!(fields
            .skills
            .get(SkillCategory::CloudDevOps)
            .contains(&"kubernetes".to_string()));
    }

    #[test]
    fn test_into_parse_result_fills_blanks() {
        let fields = ResumeFields {
            name: None,
            email: Some("a@b.io".into()),
            phone: None,
            skills: ExtractedSkills::default(),
        };
        let result = fields.into_parse_result();
        assert!(result.success);
        assert_eq!(result.name, "");
        assert_eq!(result.email, "a@b.io");
        assert_eq!(result.skills, "");
    }

    #[test]
    fn test_extractor_is_deterministic() {
        let extractor = ResumeExtractor::new();
        let text = ExtractedText::new(SAMPLE).unwrap();
        assert_eq!(extractor.extract_fields(&text), extractor.extract_fields(&text));
    }
}
