//! REST request and response bodies.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuestionRes {
    pub key: String,
    pub prompt: String,
    /// One of `rating`, `yesno`, `text`.
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemplateRes {
    pub id: String,
    pub name: String,
    pub questions: Vec<QuestionRes>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListTemplatesRes {
    pub templates: Vec<TemplateRes>,
}

/// Raw form answers keyed by question key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubmitSurveyReq {
    pub answers: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SubmitSurveyRes {
    pub id: String,
    /// Absent when the free text could not be classified (or was not answered).
    pub text_sentiment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeedbackRes {
    pub id: String,
    pub template_id: String,
    pub submitted_at: String,
    pub raw_text: String,
    pub rating: Option<u8>,
    /// `positive` or `negative`.
    pub yes_no: Option<String>,
    pub text_sentiment: Option<f64>,
    pub source_language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ListFeedbackRes {
    pub feedback: Vec<FeedbackRes>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TriCountRes {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BiCountRes {
    pub positive: u64,
    pub negative: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SentimentPointRes {
    pub submitted_at: String,
    pub polarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardRes {
    pub rating: TriCountRes,
    pub yes_no: BiCountRes,
    pub text: TriCountRes,
    pub total_records: u64,
    pub feedback_over_time: Vec<SentimentPointRes>,
    pub forecast: Option<f64>,
    pub refreshed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlertsRes {
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}
