//! Survey templates.
//!
//! A template declares which questions a survey asks and the kind of each question. Intake
//! uses the declared kind to decide how a raw form value is coerced, so no code matches on
//! question key names.
//!
//! ## Template files
//!
//! Extra templates are loaded from `*.yaml` / `*.yml` files in the configured template
//! directory, one template per file:
//!
//! ```yaml
//! id: checkout
//! name: Checkout survey
//! questions:
//!   - key: stars
//!     prompt: How was checkout?
//!     kind: rating
//!   - key: again
//!     prompt: Would you shop again?
//!     kind: yesno
//!   - key: notes
//!     prompt: Anything else?
//!     kind: text
//! ```

use crate::constants::{DEFAULT_TEMPLATE_ID, TEMPLATE_EXTENSIONS};
use crate::validation::validate_identifier;
use crate::{FeedbackError, FeedbackResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

/// How a question's raw answer is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Rating,
    YesNo,
    Text,
}

impl QuestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Rating => "rating",
            QuestionKind::YesNo => "yesno",
            QuestionKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub key: String,
    pub prompt: String,
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyTemplate {
    pub id: String,
    pub name: String,
    pub questions: Vec<Question>,
}

impl SurveyTemplate {
    /// The template that is always available: a rating, a yes/no and a free-text question.
    pub fn builtin_default() -> Self {
        Self {
            id: DEFAULT_TEMPLATE_ID.into(),
            name: "Customer feedback".into(),
            questions: vec![
                Question {
                    key: "rating".into(),
                    prompt: "How would you rate your experience?".into(),
                    kind: QuestionKind::Rating,
                },
                Question {
                    key: "recommend".into(),
                    prompt: "Would you recommend us to a friend?".into(),
                    kind: QuestionKind::YesNo,
                },
                Question {
                    key: "feedback".into(),
                    prompt: "Tell us more about your experience".into(),
                    kind: QuestionKind::Text,
                },
            ],
        }
    }

    pub fn question(&self, key: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.key == key)
    }

    /// Checks identifiers and the one-question-per-kind rule.
    ///
    /// A record holds a single rating, yes/no and text field, so a template with two questions
    /// of the same kind could not be stored without losing an answer.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidInput` describing the first problem found.
    pub fn validate(&self) -> FeedbackResult<()> {
        validate_identifier("template id", &self.id)?;

        if self.name.trim().is_empty() {
            return Err(FeedbackError::InvalidInput(format!(
                "template {} has an empty name",
                self.id
            )));
        }

        if self.questions.is_empty() {
            return Err(FeedbackError::InvalidInput(format!(
                "template {} has no questions",
                self.id
            )));
        }

        let mut keys = HashSet::new();
        let mut kinds = HashSet::new();
        for q in &self.questions {
            validate_identifier("question key", &q.key)?;
            if q.prompt.trim().is_empty() {
                return Err(FeedbackError::InvalidInput(format!(
                    "question {} in template {} has an empty prompt",
                    q.key, self.id
                )));
            }
            if !keys.insert(q.key.as_str()) {
                return Err(FeedbackError::InvalidInput(format!(
                    "duplicate question key {} in template {}",
                    q.key, self.id
                )));
            }
            if !kinds.insert(q.kind) {
                return Err(FeedbackError::InvalidInput(format!(
                    "template {} declares more than one {:?} question",
                    self.id, q.kind
                )));
            }
        }

        Ok(())
    }
}

/// The set of templates submissions can refer to, keyed by id.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, SurveyTemplate>,
}

impl TemplateRegistry {
    /// A registry holding only the built-in default template.
    pub fn with_builtin() -> Self {
        let default = SurveyTemplate::builtin_default();
        let mut templates = BTreeMap::new();
        templates.insert(default.id.clone(), default);
        Self { templates }
    }

    /// The built-in template plus every template file in `dir`, if given.
    ///
    /// A file may replace the built-in `default` template; two files declaring the same id is
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError` if the directory cannot be read (`FileRead`), a file is not
    /// valid YAML (`YamlDeserialization`), or a template fails validation (`InvalidInput`).
    pub fn load(dir: Option<&Path>) -> FeedbackResult<Self> {
        let mut registry = Self::with_builtin();
        let Some(dir) = dir else {
            return Ok(registry);
        };

        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(FeedbackError::FileRead)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| TEMPLATE_EXTENSIONS.contains(&e))
            })
            .collect();
        paths.sort();

        let mut seen = HashSet::new();
        for path in paths {
            let contents = fs::read_to_string(&path).map_err(FeedbackError::FileRead)?;
            let template: SurveyTemplate =
                serde_yaml::from_str(&contents).map_err(FeedbackError::YamlDeserialization)?;
            template.validate()?;

            if !seen.insert(template.id.clone()) {
                return Err(FeedbackError::InvalidInput(format!(
                    "template id {} is declared by more than one file (second: {})",
                    template.id,
                    path.display()
                )));
            }

            tracing::info!("loaded survey template {} from {}", template.id, path.display());
            registry.templates.insert(template.id.clone(), template);
        }

        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&SurveyTemplate> {
        self.templates.get(id)
    }

    /// All templates ordered by id.
    pub fn list(&self) -> Vec<&SurveyTemplate> {
        self.templates.values().collect()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CHECKOUT: &str = "\
id: checkout
name: Checkout survey
questions:
  - key: stars
    prompt: How was checkout?
    kind: rating
  - key: notes
    prompt: Anything else?
    kind: text
";

    #[test]
    fn builtin_default_is_valid() {
        let t = SurveyTemplate::builtin_default();
        t.validate().expect("builtin template should validate");
        assert_eq!(t.question("recommend").unwrap().kind, QuestionKind::YesNo);
        assert!(t.question("missing").is_none());
    }

    #[test]
    fn load_without_dir_has_only_default() {
        let registry = TemplateRegistry::load(None).unwrap();
        let ids: Vec<_> = registry.list().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![DEFAULT_TEMPLATE_ID]);
    }

    #[test]
    fn load_reads_yaml_files_and_ignores_others() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("checkout.yaml"), CHECKOUT).unwrap();
        fs::write(tmp.path().join("README.md"), "not a template").unwrap();

        let registry = TemplateRegistry::load(Some(tmp.path())).unwrap();
        let checkout = registry.get("checkout").expect("checkout should load");
        assert_eq!(checkout.questions.len(), 2);
        assert_eq!(checkout.question("stars").unwrap().kind, QuestionKind::Rating);
        assert!(registry.get(DEFAULT_TEMPLATE_ID).is_some());
    }

    #[test]
    fn duplicate_ids_across_files_are_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.yaml"), CHECKOUT).unwrap();
        fs::write(tmp.path().join("b.yml"), CHECKOUT).unwrap();

        let err = TemplateRegistry::load(Some(tmp.path())).unwrap_err();
        assert!(matches!(err, FeedbackError::InvalidInput(_)));
    }

    #[test]
    fn two_questions_of_one_kind_are_rejected() {
        let mut t = SurveyTemplate::builtin_default();
        t.questions.push(Question {
            key: "second_rating".into(),
            prompt: "And the staff?".into(),
            kind: QuestionKind::Rating,
        });
        assert!(matches!(t.validate(), Err(FeedbackError::InvalidInput(_))));
    }

    #[test]
    fn invalid_yaml_is_reported() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bad.yaml"), "id: [unterminated").unwrap();
        let err = TemplateRegistry::load(Some(tmp.path())).unwrap_err();
        assert!(matches!(err, FeedbackError::YamlDeserialization(_)));
    }

    #[test]
    fn unknown_question_kind_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("bad.yaml"),
            CHECKOUT.replace("kind: text", "kind: essay"),
        )
        .unwrap();
        assert!(TemplateRegistry::load(Some(tmp.path())).is_err());
    }
}
