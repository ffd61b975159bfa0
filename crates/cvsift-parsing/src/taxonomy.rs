//! Skill vocabulary: the closed set of categories, their canonical skills, and
//! the abbreviation table used to seed detection.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use cvsift_core::config_file::TaxonomyConfig;

/// Skill category. Ordering follows declaration order, which is also the
/// order categories appear in the flattened skills string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    #[serde(rename = "Programming Languages")]
    ProgrammingLanguages,
    #[serde(rename = "Web Technologies")]
    WebTechnologies,
    #[serde(rename = "Databases")]
    Databases,
    #[serde(rename = "Cloud & DevOps")]
    CloudDevOps,
    #[serde(rename = "AI & Data Science")]
    AiDataScience,
    #[serde(rename = "Tools & Methodologies")]
    ToolsMethodologies,
    /// Catch-all for entity-detected skills that match no taxonomy category.
    #[serde(rename = "Other Skills")]
    Other,
}

impl SkillCategory {
    /// The taxonomy categories, excluding [`SkillCategory::Other`].
    pub const TAXONOMY: [SkillCategory; 6] = [
        SkillCategory::ProgrammingLanguages,
        SkillCategory::WebTechnologies,
        SkillCategory::Databases,
        SkillCategory::CloudDevOps,
        SkillCategory::AiDataScience,
        SkillCategory::ToolsMethodologies,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            SkillCategory::ProgrammingLanguages => "Programming Languages",
            SkillCategory::WebTechnologies => "Web Technologies",
            SkillCategory::Databases => "Databases",
            SkillCategory::CloudDevOps => "Cloud & DevOps",
            SkillCategory::AiDataScience => "AI & Data Science",
            SkillCategory::ToolsMethodologies => "Tools & Methodologies",
            SkillCategory::Other => "Other Skills",
        }
    }

    /// Look up a category by display name, case-insensitively.
    pub fn from_display_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::TAXONOMY
            .into_iter()
            .chain(std::iter::once(SkillCategory::Other))
            .find(|c| c.display_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

const PROGRAMMING_LANGUAGES: &[&str] = &[
    "python", "java", "javascript", "typescript", "c++", "c#", "ruby", "php", "swift", "kotlin",
    "go", "rust", "scala", "perl", "r", "matlab", "sql", "bash", "powershell",
];

const WEB_TECHNOLOGIES: &[&str] = &[
    "html", "css", "react", "angular", "vue.js", "node.js", "express.js", "django", "flask",
    "spring", "asp.net", "jquery", "bootstrap", "tailwind", "webpack", "graphql", "rest api",
    "web services", "microservices",
];

const DATABASES: &[&str] = &[
    "mysql", "postgresql", "mongodb", "redis", "elasticsearch", "oracle", "sql server", "sqlite",
    "cassandra", "dynamodb", "mariadb", "neo4j", "firebase", "nosql",
];

const CLOUD_DEVOPS: &[&str] = &[
    "aws", "azure", "google cloud", "docker", "kubernetes", "jenkins", "terraform", "ansible",
    "circleci", "github actions", "gitlab ci", "prometheus", "grafana", "devops", "ci/cd",
    "cloud computing",
];

const AI_DATA_SCIENCE: &[&str] = &[
    "machine learning", "deep learning", "neural networks", "nlp", "computer vision",
    "tensorflow", "pytorch", "scikit-learn", "pandas", "numpy", "keras", "opencv",
    "data analysis", "data visualization", "big data", "hadoop", "spark",
];

const TOOLS_METHODOLOGIES: &[&str] = &[
    "git", "jira", "agile", "scrum", "kanban", "tdd", "unit testing", "ci/cd", "rest", "soap",
    "design patterns", "oop", "functional programming",
];

const ABBREVIATIONS: &[(&str, &str)] = &[
    ("ML", "Machine Learning"),
    ("AI", "Artificial Intelligence"),
    ("DL", "Deep Learning"),
    ("NLP", "Natural Language Processing"),
    ("CV", "Computer Vision"),
    ("JS", "JavaScript"),
    ("TS", "TypeScript"),
    ("BE", "Backend"),
    ("FE", "Frontend"),
    ("FS", "Full Stack"),
    ("DB", "Database"),
    ("UI", "User Interface"),
    ("UX", "User Experience"),
    ("CI", "Continuous Integration"),
    ("CD", "Continuous Deployment"),
    ("AWS", "Amazon Web Services"),
    ("GCP", "Google Cloud Platform"),
    ("K8s", "Kubernetes"),
];

/// Abbreviation → full-form entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abbreviation {
    pub short: String,
    pub full: String,
}

impl Abbreviation {
    /// Whether `text` contains the abbreviation as a whole word, ignoring
    /// ASCII case (`"ML"` fires on `"ml"` but not on `"html"`). A preceding
    /// dot also joins words, so `"JS"` does not fire on `"node.js"`.
    pub fn occurs_in(&self, text: &str) -> bool {
        if self.short.is_empty() {
            return false;
        }
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        // ASCII lowercasing keeps byte offsets aligned with `text`.
        let haystack = text.to_ascii_lowercase();
        let needle = self.short.to_ascii_lowercase();
        haystack.match_indices(needle.as_str()).any(|(start, m)| {
            let before = text[..start].chars().next_back();
            let after = text[start + m.len()..].chars().next();
            !before.is_some_and(|c| is_word(c) || c == '.') && !after.is_some_and(is_word)
        })
    }
}

/// Category → canonical skills mapping plus the abbreviation table.
///
/// Built once when the parser handle is created and only read afterwards.
#[derive(Debug, Clone)]
pub struct SkillTaxonomy {
    categories: BTreeMap<SkillCategory, Vec<String>>,
    abbreviations: Vec<Abbreviation>,
}

impl Default for SkillTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SkillTaxonomy {
    /// The built-in vocabulary.
    pub fn builtin() -> Self {
        let table: [(SkillCategory, &[&str]); 6] = [
            (SkillCategory::ProgrammingLanguages, PROGRAMMING_LANGUAGES),
            (SkillCategory::WebTechnologies, WEB_TECHNOLOGIES),
            (SkillCategory::Databases, DATABASES),
            (SkillCategory::CloudDevOps, CLOUD_DEVOPS),
            (SkillCategory::AiDataScience, AI_DATA_SCIENCE),
            (SkillCategory::ToolsMethodologies, TOOLS_METHODOLOGIES),
        ];

        let categories = table
            .into_iter()
            .map(|(category, skills)| {
                (category, skills.iter().map(|s| s.to_string()).collect())
            })
            .collect();

        let abbreviations = ABBREVIATIONS
            .iter()
            .map(|(short, full)| Abbreviation {
                short: short.to_string(),
                full: full.to_string(),
            })
            .collect();

        Self {
            categories,
            abbreviations,
        }
    }

    /// The built-in vocabulary extended with a `[taxonomy]` config section.
    ///
    /// Extra skills are lowercased and appended to their category; unknown
    /// category names are logged and ignored. Extra abbreviations replace a
    /// built-in entry with the same short form.
    pub fn with_extensions(config: &TaxonomyConfig) -> Self {
        let mut taxonomy = Self::builtin();

        if let Some(extra_skills) = &config.extra_skills {
            for (name, skills) in extra_skills {
                match SkillCategory::from_display_name(name) {
                    Some(SkillCategory::Other) | None => {
                        tracing::warn!(category = %name, "ignoring extra skills for unknown category");
                    }
                    Some(category) => {
                        for skill in skills {
                            taxonomy.add_skill(category, skill);
                        }
                    }
                }
            }
        }

        if let Some(extra_abbreviations) = &config.extra_abbreviations {
            for (short, full) in extra_abbreviations {
                taxonomy.add_abbreviation(short, full);
            }
        }

        taxonomy
    }

    /// Add a canonical skill (lowercased) unless already present.
    pub fn add_skill(&mut self, category: SkillCategory, skill: &str) {
        let skill = skill.trim().to_lowercase();
        if skill.is_empty() || category == SkillCategory::Other {
            return;
        }
        let skills = self.categories.entry(category).or_default();
        if !skills.contains(&skill) {
            skills.push(skill);
        }
    }

    /// Add or replace an abbreviation.
    pub fn add_abbreviation(&mut self, short: &str, full: &str) {
        let short = short.trim();
        let full = full.trim();
        if short.is_empty() || full.is_empty() {
            return;
        }
        match self.abbreviations.iter_mut().find(|a| a.short == short) {
            Some(existing) => existing.full = full.to_string(),
            None => self.abbreviations.push(Abbreviation {
                short: short.to_string(),
                full: full.to_string(),
            }),
        }
    }

    /// Canonical skills of one category, in declaration order.
    pub fn skills(&self, category: SkillCategory) -> &[String] {
        self.categories
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Iterate categories in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = (SkillCategory, &[String])> {
        self.categories.iter().map(|(c, s)| (*c, s.as_slice()))
    }

    pub fn abbreviations(&self) -> &[Abbreviation] {
        &self.abbreviations
    }

    /// First category holding a canonical skill equal to `skill`, ignoring case.
    pub fn category_of(&self, skill: &str) -> Option<SkillCategory> {
        let skill = skill.to_lowercase();
        self.categories()
            .find(|(_, skills)| skills.iter().any(|s| *s == skill))
            .map(|(category, _)| category)
    }
}
