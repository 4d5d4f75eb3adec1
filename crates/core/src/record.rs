//! Feedback records.
//!
//! A [`FeedbackRecord`] is one submitted survey response. Records are immutable once built and
//! are only ever appended to the [`FeedbackStore`](crate::store::FeedbackStore).

use crate::{FeedbackError, FeedbackResult};
use chrono::{DateTime, Utc};
use pulse_types::{NonEmptyText, Polarity, Rating};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Answer to a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YesNo {
    Positive,
    Negative,
}

impl YesNo {
    /// Maps the textual answers `yes` and `no` (case-insensitive, surrounding whitespace
    /// ignored) to the enum. Anything else is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("yes") {
            Some(YesNo::Positive)
        } else if value.eq_ignore_ascii_case("no") {
            Some(YesNo::Negative)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Positive => "positive",
            YesNo::Negative => "negative",
        }
    }
}

/// One persisted survey response.
///
/// Optional fields are omitted from the serialised form when absent, so an absent rating is
/// never confused with a zero value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub template_id: NonEmptyText,
    pub submitted_at: DateTime<Utc>,
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yes_no: Option<YesNo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_sentiment: Option<Polarity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
}

/// Builder for [`FeedbackRecord`] that enforces the "at least one answered question" rule.
#[derive(Debug, Clone)]
pub struct FeedbackRecordBuilder {
    template_id: NonEmptyText,
    lines: Vec<String>,
    rating: Option<Rating>,
    yes_no: Option<YesNo>,
    text: Option<String>,
    text_sentiment: Option<Polarity>,
    source_language: Option<String>,
}

impl FeedbackRecordBuilder {
    pub fn new(template_id: NonEmptyText) -> Self {
        Self {
            template_id,
            lines: Vec::new(),
            rating: None,
            yes_no: None,
            text: None,
            text_sentiment: None,
            source_language: None,
        }
    }

    pub fn rating(mut self, prompt: &str, rating: Rating) -> Self {
        self.lines.push(format!("{prompt}: {rating}"));
        self.rating = Some(rating);
        self
    }

    pub fn yes_no(mut self, prompt: &str, answer: YesNo) -> Self {
        let word = match answer {
            YesNo::Positive => "yes",
            YesNo::Negative => "no",
        };
        self.lines.push(format!("{prompt}: {word}"));
        self.yes_no = Some(answer);
        self
    }

    /// Records the free-text answer. `text` is the stored form (translated when translation
    /// succeeded); `sentiment` is absent when the text could not be classified.
    pub fn text(
        mut self,
        prompt: &str,
        text: &str,
        sentiment: Option<Polarity>,
        source_language: Option<String>,
    ) -> Self {
        self.lines.push(format!("{prompt}: {text}"));
        self.text = Some(text.to_string());
        self.text_sentiment = sentiment;
        self.source_language = source_language;
        self
    }

    /// # Errors
    ///
    /// Returns `FeedbackError::Validation` when no question was answered.
    pub fn build(self) -> FeedbackResult<FeedbackRecord> {
        let answered = self.rating.is_some()
            || self.yes_no.is_some()
            || self.text.as_deref().is_some_and(|t| !t.trim().is_empty());
        if !answered {
            return Err(FeedbackError::Validation(
                "at least one question must be answered".into(),
            ));
        }

        Ok(FeedbackRecord {
            id: Uuid::new_v4(),
            template_id: self.template_id,
            submitted_at: Utc::now(),
            raw_text: self.lines.join("\n"),
            rating: self.rating,
            yes_no: self.yes_no,
            text_sentiment: self.text_sentiment,
            source_language: self.source_language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> NonEmptyText {
        NonEmptyText::new("default").unwrap()
    }

    #[test]
    fn yes_no_parse_is_case_insensitive() {
        assert_eq!(YesNo::parse(" Yes "), Some(YesNo::Positive));
        assert_eq!(YesNo::parse("NO"), Some(YesNo::Negative));
        assert_eq!(YesNo::parse("maybe"), None);
        assert_eq!(YesNo::parse(""), None);
    }

    #[test]
    fn builder_requires_an_answer() {
        let err = FeedbackRecordBuilder::new(template()).build().unwrap_err();
        assert!(matches!(err, FeedbackError::Validation(_)));
    }

    #[test]
    fn builder_joins_raw_text_in_call_order() {
        let record = FeedbackRecordBuilder::new(template())
            .rating("Overall", Rating::new(4).unwrap())
            .yes_no("Recommend?", YesNo::Negative)
            .text("Comments", "slow checkout", Some(Polarity::new(-0.3)), None)
            .build()
            .unwrap();

        assert_eq!(
            record.raw_text,
            "Overall: 4\nRecommend?: no\nComments: slow checkout"
        );
        assert_eq!(record.rating, Some(Rating::new(4).unwrap()));
        assert_eq!(record.yes_no, Some(YesNo::Negative));
        assert_eq!(record.text_sentiment, Some(Polarity::new(-0.3)));
    }

    #[test]
    fn text_without_sentiment_still_counts_as_answered() {
        let record = FeedbackRecordBuilder::new(template())
            .text("Comments", "sehr gut", None, Some("de".into()))
            .build()
            .unwrap();
        assert!(record.text_sentiment.is_none());
        assert_eq!(record.source_language.as_deref(), Some("de"));
    }

    #[test]
    fn absent_fields_are_omitted_when_serialised() {
        let record = FeedbackRecordBuilder::new(template())
            .rating("Overall", Rating::new(5).unwrap())
            .build()
            .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["rating"], 5);
        assert!(!obj.contains_key("yes_no"));
        assert!(!obj.contains_key("text_sentiment"));

        let zero = FeedbackRecordBuilder::new(template())
            .text("Comments", "ok", Some(Polarity::NEUTRAL), None)
            .build()
            .unwrap();
        let back: FeedbackRecord =
            serde_json::from_str(&serde_json::to_string(&zero).unwrap()).unwrap();
        assert_eq!(back.text_sentiment, Some(Polarity::NEUTRAL));
        assert_eq!(back.rating, None);
    }
}
