//! # Pulse Core
//!
//! Core business logic for the Pulse survey feedback service.
//!
//! This crate contains pure data operations:
//! - Survey intake: coercing raw answers against a template, language handling, classification
//! - The append-only feedback store under the configured data directory
//! - Aggregation, alerts and the periodically refreshed dashboard cache
//!
//! **No API concerns**: HTTP servers and request/response types belong in `api-rest` and
//! `api-shared`.

pub mod aggregate;
pub mod alerts;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod intake;
pub mod language;
pub mod record;
pub mod sentiment;
pub mod store;
pub mod templates;
pub mod validation;

pub use aggregate::{AggregateSnapshot, BiCount, SentimentPoint, TriCount};
pub use alerts::{AlertEvaluator, AlertMessage, AlertRule};
pub use config::{CoreConfig, EnvValues};
pub use constants::DEFAULT_DATA_DIR;
pub use dashboard::{DashboardData, DashboardService, NoPredictor, Predictor};
pub use error::{FeedbackError, FeedbackResult};
pub use intake::{Answer, IntakeService};
pub use language::{
    DisabledTranslator, HttpTranslator, LanguageDetector, Translator, WhatlangDetector,
};
pub use pulse_types::{NonEmptyText, Polarity, Rating};
pub use record::{FeedbackRecord, YesNo};
pub use sentiment::{LexiconClassifier, SentimentClassifier};
pub use store::{FeedbackStore, LogFile};
pub use templates::{Question, QuestionKind, SurveyTemplate, TemplateRegistry};

use std::collections::HashMap;
use std::sync::Arc;

/// The wired-up core services for one data directory.
///
/// Cloning is cheap; all clones share the same store and dashboard cache.
#[derive(Clone)]
pub struct FeedbackService {
    store: Arc<FeedbackStore>,
    intake: IntakeService,
    dashboard: Arc<DashboardService>,
}

impl FeedbackService {
    /// Opens the store and loads templates as described by `cfg`.
    ///
    /// Uses the lexicon classifier, `whatlang` detection, and an HTTP translator when a
    /// translation URL is configured (translation is disabled otherwise).
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError` if:
    /// - the target language is not the classifier's language (`InvalidInput`),
    /// - the store cannot be opened or a template fails to load.
    pub fn from_config(cfg: &CoreConfig) -> FeedbackResult<Self> {
        if cfg.target_language() != LexiconClassifier::LANGUAGE {
            return Err(FeedbackError::InvalidInput(format!(
                "target language {} is not supported by the lexicon classifier (expected {})",
                cfg.target_language(),
                LexiconClassifier::LANGUAGE
            )));
        }

        let translator: Arc<dyn Translator> = match cfg.translate_url() {
            Some(url) => Arc::new(HttpTranslator::new(url)?),
            None => {
                tracing::info!(
                    "no translation service configured; foreign text is stored unclassified"
                );
                Arc::new(DisabledTranslator)
            }
        };

        let store = Arc::new(FeedbackStore::open(cfg.feedback_log_path())?);
        let templates = Arc::new(TemplateRegistry::load(cfg.template_dir())?);

        let intake = IntakeService::new(
            templates,
            store.clone(),
            Arc::new(LexiconClassifier::new()),
            Arc::new(WhatlangDetector::new(cfg.target_language())),
            translator,
            cfg.target_language(),
        );
        let dashboard = Arc::new(DashboardService::new(
            store.clone(),
            AlertEvaluator::with_default_rules(),
        ));

        Ok(Self {
            store,
            intake,
            dashboard,
        })
    }

    /// Assembles a service from already-built parts.
    pub fn from_parts(
        store: Arc<FeedbackStore>,
        intake: IntakeService,
        dashboard: Arc<DashboardService>,
    ) -> Self {
        Self {
            store,
            intake,
            dashboard,
        }
    }

    pub async fn submit_survey(
        &self,
        template_id: &str,
        answers: &HashMap<String, String>,
    ) -> FeedbackResult<FeedbackRecord> {
        self.intake.submit_survey(template_id, answers).await
    }

    pub fn get_dashboard_data(&self) -> FeedbackResult<DashboardData> {
        self.dashboard.get_dashboard_data()
    }

    pub fn get_alerts(&self) -> FeedbackResult<Vec<AlertMessage>> {
        self.dashboard.get_alerts()
    }

    pub fn records(&self) -> FeedbackResult<Vec<FeedbackRecord>> {
        self.store.all()
    }

    pub fn templates(&self) -> &TemplateRegistry {
        self.intake.templates()
    }

    pub fn dashboard(&self) -> Arc<DashboardService> {
        self.dashboard.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn from_config_wires_store_intake_and_dashboard() {
        let tmp = TempDir::new().unwrap();
        let cfg = CoreConfig::with_data_dir(tmp.path().join("data"));
        let svc = FeedbackService::from_config(&cfg).expect("service should build");

        let answers = HashMap::from([("rating".to_string(), "5".to_string())]);
        let record = svc.submit_survey("default", &answers).await.unwrap();

        assert_eq!(svc.records().unwrap(), vec![record]);
        let data = svc.get_dashboard_data().unwrap();
        assert_eq!(data.snapshot.rating.positive, 1);
        assert_eq!(data.snapshot.yes_no, BiCount::default());
        assert_eq!(data.snapshot.text, TriCount::default());
        assert!(svc.get_alerts().unwrap().is_empty());
        assert!(cfg.feedback_log_path().is_file());
    }

    #[tokio::test]
    async fn reopening_the_data_dir_keeps_records() {
        let tmp = TempDir::new().unwrap();
        let cfg = CoreConfig::with_data_dir(tmp.path().to_path_buf());
        let answers = HashMap::from([("recommend".to_string(), "no".to_string())]);

        let first = FeedbackService::from_config(&cfg).unwrap();
        first.submit_survey("default", &answers).await.unwrap();
        drop(first);

        let second = FeedbackService::from_config(&cfg).unwrap();
        let data = second.get_dashboard_data().unwrap();
        assert_eq!(data.snapshot.yes_no.negative, 1);
    }

    #[test]
    fn from_config_rejects_a_target_language_the_classifier_cannot_score() {
        let tmp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(
            tmp.path().to_path_buf(),
            None,
            "fr".into(),
            constants::DEFAULT_REFRESH_INTERVAL,
            None,
        )
        .unwrap();
        assert!(matches!(
            FeedbackService::from_config(&cfg),
            Err(FeedbackError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn short_english_text_is_classified_with_default_wiring() {
        let tmp = TempDir::new().unwrap();
        let cfg = CoreConfig::with_data_dir(tmp.path().to_path_buf());
        let svc = FeedbackService::from_config(&cfg).unwrap();

        let answers = HashMap::from([("feedback".to_string(), "rude staff".to_string())]);
        let record = svc.submit_survey("default", &answers).await.unwrap();
        assert!(record.text_sentiment.unwrap().value() < 0.0);
        assert_eq!(record.source_language.as_deref(), Some("en"));
    }
}
