//! Language detection and translation of free-text answers.
//!
//! Both concerns sit behind traits so Intake can be tested without network access, and both
//! failures are recoverable: Intake stores the untranslated text and skips classification.

use crate::{FeedbackError, FeedbackResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use whatlang::Lang;

/// Upper bound on a single translation request.
const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Identifies the language of a piece of text.
pub trait LanguageDetector: Send + Sync {
    /// Returns a language code (ISO 639-1 where one exists).
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::LanguageDetection` when no language can be identified.
    fn detect(&self, text: &str) -> FeedbackResult<String>;
}

/// Translates text between languages.
#[async_trait]
pub trait Translator: Send + Sync {
    /// # Errors
    ///
    /// Returns `FeedbackError::Translation` on any failure.
    async fn translate(&self, text: &str, source: &str, target: &str) -> FeedbackResult<String>;
}

/// Texts shorter than this many characters are not run through detection; trigram models guess
/// almost at random on a word or two.
const MIN_DETECTION_CHARS: usize = 40;

/// Languages the detector chooses between. Keeping the set small stops short English answers
/// from being labelled as Tok Pisin or Afrikaans.
const DETECTABLE_LANGUAGES: &[Lang] = &[
    Lang::Eng,
    Lang::Spa,
    Lang::Fra,
    Lang::Deu,
    Lang::Ita,
    Lang::Por,
    Lang::Nld,
    Lang::Pol,
    Lang::Rus,
    Lang::Ukr,
    Lang::Tur,
    Lang::Swe,
    Lang::Ara,
    Lang::Hin,
    Lang::Jpn,
    Lang::Kor,
    Lang::Cmn,
];

/// [`LanguageDetector`] backed by the `whatlang` trigram models.
///
/// Short texts, texts with no recognisable script and unreliable guesses are reported as the
/// fallback language (normally the target language), so they are classified as-is instead of
/// being sent for translation.
pub struct WhatlangDetector {
    detector: whatlang::Detector,
    fallback: String,
}

impl WhatlangDetector {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            detector: whatlang::Detector::with_allowlist(DETECTABLE_LANGUAGES.to_vec()),
            fallback: fallback.into(),
        }
    }
}

impl LanguageDetector for WhatlangDetector {
    fn detect(&self, text: &str) -> FeedbackResult<String> {
        let text = text.trim();
        if text.chars().count() < MIN_DETECTION_CHARS {
            return Ok(self.fallback.clone());
        }

        match self.detector.detect(text) {
            Some(info) if info.is_reliable() => Ok(iso_639_1(info.lang()).to_string()),
            Some(info) => {
                tracing::debug!(
                    "unreliable language detection ({}, confidence {:.2}), assuming {}",
                    info.lang().code(),
                    info.confidence(),
                    self.fallback
                );
                Ok(self.fallback.clone())
            }
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Two-letter code for the languages translation services commonly support; the three-letter
/// `whatlang` code otherwise.
fn iso_639_1(lang: Lang) -> &'static str {
    match lang {
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Por => "pt",
        Lang::Nld => "nl",
        Lang::Pol => "pl",
        Lang::Rus => "ru",
        Lang::Ukr => "uk",
        Lang::Tur => "tr",
        Lang::Swe => "sv",
        Lang::Ara => "ar",
        Lang::Hin => "hi",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Cmn => "zh",
        other => other.code(),
    }
}

#[derive(Debug, Serialize)]
struct TranslateReq<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateRes {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// [`Translator`] for a LibreTranslate-compatible HTTP service (`POST {base}/translate`).
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTranslator {
    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidInput` if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> FeedbackResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(TRANSLATE_TIMEOUT)
            .build()
            .map_err(|e| FeedbackError::InvalidInput(format!("translation client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/translate", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> FeedbackResult<String> {
        let body = TranslateReq {
            q: text,
            source,
            target,
            format: "text",
        };

        let res = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| FeedbackError::Translation(e.to_string()))?
            .error_for_status()
            .map_err(|e| FeedbackError::Translation(e.to_string()))?;

        let parsed: TranslateRes = res
            .json()
            .await
            .map_err(|e| FeedbackError::Translation(e.to_string()))?;

        if parsed.translated_text.trim().is_empty() {
            return Err(FeedbackError::Translation(
                "translation service returned empty text".into(),
            ));
        }

        Ok(parsed.translated_text)
    }
}

/// [`Translator`] used when no translation service is configured; always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTranslator;

#[async_trait]
impl Translator for DisabledTranslator {
    async fn translate(&self, _text: &str, source: &str, target: &str) -> FeedbackResult<String> {
        Err(FeedbackError::Translation(format!(
            "no translation service configured ({source} -> {target})"
        )))
    }
}
