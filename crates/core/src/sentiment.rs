//! Sentiment classification of free-text answers.
//!
//! The default classifier is lexicon based: words carry a prior polarity, intensifiers scale
//! the next scored word, and negations flip (and dampen) scored words that follow within a
//! short window. The text score is the mean of its scored words.

use pulse_types::Polarity;
use std::collections::HashMap;

/// Maps free text to a polarity in `[-1, 1]`.
///
/// Implementations must be deterministic and must never fail; input they cannot make sense of
/// scores `0.0`.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Polarity;
}

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("amazing", 0.9),
    ("awesome", 0.85),
    ("excellent", 0.9),
    ("fantastic", 0.85),
    ("outstanding", 0.9),
    ("perfect", 0.9),
    ("wonderful", 0.85),
    ("superb", 0.85),
    ("love", 0.8),
    ("loved", 0.8),
    ("great", 0.75),
    ("best", 0.8),
    ("delighted", 0.8),
    ("brilliant", 0.8),
    ("happy", 0.7),
    ("pleased", 0.65),
    ("impressed", 0.7),
    ("recommend", 0.6),
    ("good", 0.7),
    ("nice", 0.55),
    ("friendly", 0.6),
    ("helpful", 0.6),
    ("easy", 0.45),
    ("fast", 0.45),
    ("quick", 0.4),
    ("clean", 0.4),
    ("reliable", 0.5),
    ("smooth", 0.45),
    ("satisfied", 0.55),
    ("enjoyed", 0.65),
    ("like", 0.3),
    ("liked", 0.4),
    ("fine", 0.25),
    ("ok", 0.15),
    ("okay", 0.15),
    ("thanks", 0.4),
    ("thank", 0.4),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("terrible", -0.9),
    ("horrible", -0.9),
    ("awful", -0.9),
    ("worst", -0.95),
    ("disgusting", -0.9),
    ("useless", -0.8),
    ("hate", -0.85),
    ("hated", -0.85),
    ("angry", -0.75),
    ("furious", -0.9),
    ("disappointed", -0.7),
    ("disappointing", -0.7),
    ("frustrating", -0.7),
    ("frustrated", -0.7),
    ("poor", -0.6),
    ("bad", -0.7),
    ("broken", -0.65),
    ("rude", -0.7),
    ("slow", -0.45),
    ("late", -0.4),
    ("expensive", -0.4),
    ("confusing", -0.5),
    ("difficult", -0.45),
    ("dirty", -0.55),
    ("unhelpful", -0.6),
    ("wrong", -0.5),
    ("problem", -0.4),
    ("problems", -0.4),
    ("issue", -0.3),
    ("issues", -0.3),
    ("bug", -0.4),
    ("buggy", -0.55),
    ("crash", -0.6),
    ("crashed", -0.6),
    ("refund", -0.3),
    ("waste", -0.7),
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("so", 1.2),
    ("super", 1.3),
    ("totally", 1.3),
    ("absolutely", 1.5),
    ("quite", 1.1),
    ("somewhat", 0.7),
    ("slightly", 0.5),
    ("barely", 0.4),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "neither", "nor", "without", "don't", "dont",
    "doesn't", "doesnt", "didn't", "didnt", "isn't", "isnt", "wasn't", "wasnt", "aren't",
    "arent", "weren't", "werent", "can't", "cant", "cannot", "couldn't", "couldnt", "won't",
    "wont", "wouldn't", "wouldnt", "shouldn't", "shouldnt", "hardly",
];

/// Damping applied to a negated word: "not good" is milder than "bad".
const NEGATION_FACTOR: f64 = -0.5;

/// Lexicon-based [`SentimentClassifier`]. The word tables are English, so text must be in
/// [`LexiconClassifier::LANGUAGE`] to score anything other than 0.
#[derive(Debug, Clone)]
pub struct LexiconClassifier {
    scores: HashMap<&'static str, f64>,
    intensifiers: HashMap<&'static str, f64>,
    negation_window: usize,
}

impl LexiconClassifier {
    /// Language of the word tables (ISO 639-1).
    pub const LANGUAGE: &'static str = "en";

    pub fn new() -> Self {
        let scores = POSITIVE_WORDS
            .iter()
            .chain(NEGATIVE_WORDS)
            .copied()
            .collect();

        Self {
            scores,
            intensifiers: INTENSIFIERS.iter().copied().collect(),
            negation_window: 3,
        }
    }

    /// Number of words after a negation that it still applies to.
    pub fn with_negation_window(mut self, window: usize) -> Self {
        self.negation_window = window;
        self
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.replace('\u{2019}', "'")
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|t| t.trim_matches('\'').to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Polarity {
        let mut total = 0.0;
        let mut scored = 0usize;
        let mut modifier = 1.0;
        let mut negated = false;
        let mut since_negation = 0usize;

        for token in Self::tokenize(text) {
            if NEGATIONS.contains(&token.as_str()) {
                negated = true;
                since_negation = 0;
                continue;
            }

            if let Some(m) = self.intensifiers.get(token.as_str()) {
                modifier = *m;
                continue;
            }

            if let Some(base) = self.scores.get(token.as_str()) {
                let mut score = base * modifier;
                if negated && since_negation < self.negation_window {
                    score *= NEGATION_FACTOR;
                }
                total += score;
                scored += 1;
                modifier = 1.0;
            }

            if negated {
                since_negation += 1;
                if since_negation >= self.negation_window {
                    negated = false;
                }
            }
        }

        if scored == 0 {
            return Polarity::NEUTRAL;
        }

        Polarity::new(total / scored as f64)
    }
}
