//! Survey intake.
//!
//! Turns a raw form submission into a [`FeedbackRecord`] and appends it to the store. Each raw
//! value is coerced once into an [`Answer`] according to the kind its template declares; a
//! single invalid value rejects the whole submission before anything is written.
//!
//! Free text goes through language handling before classification. Detection or translation
//! failures never reject a submission: the original text is stored and the text sentiment is
//! left absent.

use crate::language::{LanguageDetector, Translator};
use crate::record::{FeedbackRecord, FeedbackRecordBuilder, YesNo};
use crate::sentiment::SentimentClassifier;
use crate::store::FeedbackStore;
use crate::templates::{Question, QuestionKind, TemplateRegistry};
use crate::{FeedbackError, FeedbackResult};
use pulse_types::{NonEmptyText, Polarity, Rating};
use std::collections::HashMap;
use std::sync::Arc;

/// A coerced answer to one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Rating(Rating),
    YesNo(YesNo),
    Text(NonEmptyText),
}

impl Answer {
    /// Coerces a raw form value according to the question kind.
    ///
    /// Returns `Ok(None)` for a blank value (the question was left unanswered).
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::Validation` if the value does not fit the kind.
    pub fn coerce(question: &Question, raw: &str) -> FeedbackResult<Option<Self>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let answer = match question.kind {
            QuestionKind::Rating => {
                let value: i64 = raw.parse().map_err(|_| {
                    FeedbackError::Validation(format!(
                        "{}: rating must be a whole number, got {:?}",
                        question.key, raw
                    ))
                })?;
                let rating = Rating::new(value).map_err(|e| {
                    FeedbackError::Validation(format!("{}: {}", question.key, e))
                })?;
                Answer::Rating(rating)
            }
            QuestionKind::YesNo => {
                let yes_no = YesNo::parse(raw).ok_or_else(|| {
                    FeedbackError::Validation(format!(
                        "{}: expected \"yes\" or \"no\", got {:?}",
                        question.key, raw
                    ))
                })?;
                Answer::YesNo(yes_no)
            }
            QuestionKind::Text => Answer::Text(NonEmptyText::new(raw)?),
        };

        Ok(Some(answer))
    }
}

/// Outcome of language handling for one free-text answer.
#[derive(Debug, Clone, PartialEq)]
struct PreparedText {
    text: String,
    sentiment: Option<Polarity>,
    source_language: Option<String>,
}

/// Accepts survey submissions and writes them to the store.
#[derive(Clone)]
pub struct IntakeService {
    templates: Arc<TemplateRegistry>,
    store: Arc<FeedbackStore>,
    classifier: Arc<dyn SentimentClassifier>,
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
    target_language: String,
}

impl IntakeService {
    pub fn new(
        templates: Arc<TemplateRegistry>,
        store: Arc<FeedbackStore>,
        classifier: Arc<dyn SentimentClassifier>,
        detector: Arc<dyn LanguageDetector>,
        translator: Arc<dyn Translator>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            templates,
            store,
            classifier,
            detector,
            translator,
            target_language: target_language.into(),
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Validates, classifies and stores one submission.
    ///
    /// # Arguments
    ///
    /// * `template_id` - Template the answers belong to
    /// * `answers` - Raw form values keyed by question key
    ///
    /// # Returns
    ///
    /// The stored record.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError` if:
    /// - the template does not exist (`UnknownTemplate`),
    /// - a key is not declared by the template, a value cannot be coerced, or no question was
    ///   answered (`Validation`),
    /// - the record could not be written (storage errors); nothing is stored in that case.
    pub async fn submit_survey(
        &self,
        template_id: &str,
        answers: &HashMap<String, String>,
    ) -> FeedbackResult<FeedbackRecord> {
        let template = self
            .templates
            .get(template_id)
            .ok_or_else(|| FeedbackError::UnknownTemplate(template_id.to_string()))?;

        let mut unknown: Vec<&str> = answers
            .keys()
            .filter(|k| template.question(k).is_none())
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(FeedbackError::Validation(format!(
                "unknown question keys for template {}: {}",
                template.id,
                unknown.join(", ")
            )));
        }

        // Coerce everything before any side effect so a bad value rejects the whole submission.
        let mut coerced = Vec::with_capacity(template.questions.len());
        for question in &template.questions {
            let Some(raw) = answers.get(&question.key) else {
                continue;
            };
            if let Some(answer) = Answer::coerce(question, raw)? {
                coerced.push((question, answer));
            }
        }

        let mut builder = FeedbackRecordBuilder::new(NonEmptyText::new(&template.id)?);
        for (question, answer) in coerced {
            builder = match answer {
                Answer::Rating(r) => builder.rating(&question.prompt, r),
                Answer::YesNo(y) => builder.yes_no(&question.prompt, y),
                Answer::Text(text) => {
                    let prepared = self.prepare_text(text.as_str()).await;
                    builder.text(
                        &question.prompt,
                        &prepared.text,
                        prepared.sentiment,
                        prepared.source_language,
                    )
                }
            };
        }

        let record = builder.build()?;
        self.store.append(record.clone())?;

        tracing::info!(
            "stored feedback {} for template {}",
            record.id,
            record.template_id
        );

        Ok(record)
    }

    async fn prepare_text(&self, text: &str) -> PreparedText {
        let language = match self.detector.detect(text) {
            Ok(language) => language,
            Err(e) => {
                tracing::warn!("storing feedback text unclassified: {}", e);
                return PreparedText {
                    text: text.to_string(),
                    sentiment: None,
                    source_language: None,
                };
            }
        };

        if language == self.target_language {
            return PreparedText {
                text: text.to_string(),
                sentiment: Some(self.classifier.classify(text)),
                source_language: Some(language),
            };
        }

        match self
            .translator
            .translate(text, &language, &self.target_language)
            .await
        {
            Ok(translated) => PreparedText {
                sentiment: Some(self.classifier.classify(&translated)),
                text: translated,
                source_language: Some(language),
            },
            Err(e) => {
                tracing::warn!(
                    "storing {} feedback text untranslated and unclassified: {}",
                    language,
                    e
                );
                PreparedText {
                    text: text.to_string(),
                    sentiment: None,
                    source_language: Some(language),
                }
            }
        }
    }
}
