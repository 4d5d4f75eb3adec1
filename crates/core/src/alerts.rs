//! Threshold alerts over the full record set.
//!
//! Rules are independent predicate/message pairs. [`AlertEvaluator::evaluate`] runs every rule
//! against the same records and emits messages in rule-declaration order; no rule suppresses
//! another.

use crate::constants::{
    NEGATIVE_SURGE_MESSAGE, NEGATIVE_SURGE_THRESHOLD, STRONG_NEGATIVE_POLARITY,
};
use crate::record::FeedbackRecord;
use serde::{Deserialize, Serialize};

/// Human-readable alert text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertMessage(String);

impl AlertMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AlertMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named predicate over the record set and the message it emits when it holds.
#[derive(Debug, Clone)]
pub struct AlertRule {
    pub name: &'static str,
    pub predicate: fn(&[FeedbackRecord]) -> bool,
    pub message: &'static str,
}

impl AlertRule {
    pub fn fires(&self, records: &[FeedbackRecord]) -> bool {
        (self.predicate)(records)
    }
}

/// More than [`NEGATIVE_SURGE_THRESHOLD`] responses with text sentiment below
/// [`STRONG_NEGATIVE_POLARITY`].
pub fn negative_text_surge(records: &[FeedbackRecord]) -> bool {
    records
        .iter()
        .filter(|r| {
            r.text_sentiment
                .is_some_and(|p| p.value() < STRONG_NEGATIVE_POLARITY)
        })
        .count()
        > NEGATIVE_SURGE_THRESHOLD
}

/// Ordered set of [`AlertRule`]s.
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    rules: Vec<AlertRule>,
}

impl AlertEvaluator {
    /// An evaluator with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// The production rule set.
    pub fn with_default_rules() -> Self {
        let mut evaluator = Self::new();
        evaluator.push_rule(AlertRule {
            name: "negative_text_surge",
            predicate: negative_text_surge,
            message: NEGATIVE_SURGE_MESSAGE,
        });
        evaluator
    }

    /// Appends a rule; it is evaluated after every rule already present.
    pub fn push_rule(&mut self, rule: AlertRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    pub fn evaluate(&self, records: &[FeedbackRecord]) -> Vec<AlertMessage> {
        self.rules
            .iter()
            .filter(|rule| rule.fires(records))
            .inspect(|rule| tracing::debug!("alert rule {} fired", rule.name))
            .map(|rule| AlertMessage::new(rule.message))
            .collect()
    }
}
