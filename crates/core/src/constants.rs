//! Constants used throughout the Pulse core crate.
//!
//! Path names, thresholds and defaults live here so the rest of the crate refers to them by name.

use std::time::Duration;

/// Default directory for feedback storage when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Filename of the append-only feedback log inside the data directory.
pub const FEEDBACK_LOG_FILENAME: &str = "feedback.jsonl";

/// Language free text is classified in unless configured otherwise (ISO 639-1).
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";

/// How often the dashboard cache is recomputed.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10);

/// Identifier of the survey template that is always available.
pub const DEFAULT_TEMPLATE_ID: &str = "default";

/// File extensions recognised as survey template definitions.
pub const TEMPLATE_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Text sentiment below this value counts as strongly negative.
pub const STRONG_NEGATIVE_POLARITY: f64 = -0.5;

/// Strongly negative responses tolerated before the surge alert fires.
pub const NEGATIVE_SURGE_THRESHOLD: usize = 5;

/// Message emitted by the negative surge alert.
pub const NEGATIVE_SURGE_MESSAGE: &str = "High number of negative feedback detected!";
