//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing in the core reads environment variables while handling a submission; the binaries
//! read them and hand the raw values to the parsing helpers below.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_REFRESH_INTERVAL, DEFAULT_TARGET_LANGUAGE, FEEDBACK_LOG_FILENAME,
};
use crate::validation::validate_language_code;
use crate::{FeedbackError, FeedbackResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    template_dir: Option<PathBuf>,
    target_language: String,
    refresh_interval: Duration,
    translate_url: Option<String>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidInput` if the target language is not a valid code, the
    /// refresh interval is zero, or `template_dir` is given but is not a directory.
    pub fn new(
        data_dir: PathBuf,
        template_dir: Option<PathBuf>,
        target_language: String,
        refresh_interval: Duration,
        translate_url: Option<String>,
    ) -> FeedbackResult<Self> {
        validate_language_code(&target_language)?;

        if refresh_interval.is_zero() {
            return Err(FeedbackError::InvalidInput(
                "refresh interval must be greater than zero".into(),
            ));
        }

        if let Some(dir) = &template_dir {
            if !dir.is_dir() {
                return Err(FeedbackError::InvalidInput(format!(
                    "template directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        let translate_url = translate_url
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());

        Ok(Self {
            data_dir,
            template_dir,
            target_language,
            refresh_interval,
            translate_url,
        })
    }

    /// Configuration with defaults for everything except the data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            template_dir: None,
            target_language: DEFAULT_TARGET_LANGUAGE.into(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            translate_url: None,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn feedback_log_path(&self) -> PathBuf {
        self.data_dir.join(FEEDBACK_LOG_FILENAME)
    }

    pub fn template_dir(&self) -> Option<&Path> {
        self.template_dir.as_deref()
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn translate_url(&self) -> Option<&str> {
        self.translate_url.as_deref()
    }
}

/// Parse the refresh interval (whole seconds) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default interval.
pub fn refresh_interval_from_env_value(value: Option<String>) -> FeedbackResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(v) = value else {
        return Ok(DEFAULT_REFRESH_INTERVAL);
    };

    let secs: u64 = v.parse().map_err(|_| {
        FeedbackError::InvalidInput(format!("refresh interval is not a whole number: {v}"))
    })?;
    if secs == 0 {
        return Err(FeedbackError::InvalidInput(
            "refresh interval must be greater than zero".into(),
        ));
    }

    Ok(Duration::from_secs(secs))
}

/// Parse the target language from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default target language. The value is
/// lowercased before validation.
pub fn target_language_from_env_value(value: Option<String>) -> FeedbackResult<String> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value {
        Some(v) => {
            validate_language_code(&v)?;
            Ok(v)
        }
        None => Ok(DEFAULT_TARGET_LANGUAGE.into()),
    }
}

/// Raw configuration values as read from the environment, one field per variable.
///
/// Every field is optional; [`EnvValues::resolve`] applies the defaults and validation.
#[derive(Clone, Debug, Default)]
pub struct EnvValues {
    pub data_dir: Option<String>,
    pub template_dir: Option<String>,
    pub target_language: Option<String>,
    pub refresh_secs: Option<String>,
    pub translate_url: Option<String>,
}

impl EnvValues {
    /// Reads `PULSE_DATA_DIR`, `PULSE_TEMPLATE_DIR`, `PULSE_TARGET_LANGUAGE`,
    /// `PULSE_REFRESH_SECS` and `PULSE_TRANSLATE_URL`.
    ///
    /// Only the binaries call this, once at startup.
    pub fn from_process_env() -> Self {
        Self {
            data_dir: std::env::var("PULSE_DATA_DIR").ok(),
            template_dir: std::env::var("PULSE_TEMPLATE_DIR").ok(),
            target_language: std::env::var("PULSE_TARGET_LANGUAGE").ok(),
            refresh_secs: std::env::var("PULSE_REFRESH_SECS").ok(),
            translate_url: std::env::var("PULSE_TRANSLATE_URL").ok(),
        }
    }

    /// Turns the raw values into a validated [`CoreConfig`].
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::InvalidInput` if any value is malformed, or if a template
    /// directory is named but does not exist.
    pub fn resolve(self) -> FeedbackResult<CoreConfig> {
        let data_dir = self
            .data_dir
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.into());
        let template_dir = self
            .template_dir
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        CoreConfig::new(
            PathBuf::from(data_dir),
            template_dir,
            target_language_from_env_value(self.target_language)?,
            refresh_interval_from_env_value(self.refresh_secs)?,
            self.translate_url,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn refresh_interval_defaults_and_parses() {
        assert_eq!(
            refresh_interval_from_env_value(None).unwrap(),
            DEFAULT_REFRESH_INTERVAL
        );
        assert_eq!(
            refresh_interval_from_env_value(Some("  ".into())).unwrap(),
            DEFAULT_REFRESH_INTERVAL
        );
        assert_eq!(
            refresh_interval_from_env_value(Some("30".into())).unwrap(),
            Duration::from_secs(30)
        );
        assert!(refresh_interval_from_env_value(Some("0".into())).is_err());
        assert!(refresh_interval_from_env_value(Some("ten".into())).is_err());
    }

    #[test]
    fn target_language_defaults_and_normalises() {
        assert_eq!(target_language_from_env_value(None).unwrap(), "en");
        assert_eq!(target_language_from_env_value(Some(" FR ".into())).unwrap(), "fr");
        assert!(target_language_from_env_value(Some("french".into())).is_err());
    }

    #[test]
    fn new_rejects_missing_template_dir() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let err = CoreConfig::new(
            tmp.path().to_path_buf(),
            Some(missing),
            "en".into(),
            DEFAULT_REFRESH_INTERVAL,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, FeedbackError::InvalidInput(_)));
    }

    #[test]
    fn new_normalises_translate_url() {
        let tmp = TempDir::new().unwrap();
        let cfg = CoreConfig::new(
            tmp.path().to_path_buf(),
            None,
            "en".into(),
            Duration::from_secs(5),
            Some("http://localhost:5000/ ".into()),
        )
        .unwrap();
        assert_eq!(cfg.translate_url(), Some("http://localhost:5000"));
        assert_eq!(cfg.feedback_log_path(), tmp.path().join(FEEDBACK_LOG_FILENAME));

        let cfg = CoreConfig::new(
            tmp.path().to_path_buf(),
            None,
            "en".into(),
            Duration::from_secs(5),
            Some("   ".into()),
        )
        .unwrap();
        assert_eq!(cfg.translate_url(), None);
    }

    #[test]
    fn env_values_resolve_with_defaults() {
        let cfg = EnvValues::default().resolve().unwrap();
        assert_eq!(cfg.data_dir(), Path::new(DEFAULT_DATA_DIR));
        assert_eq!(cfg.template_dir(), None);
        assert_eq!(cfg.target_language(), DEFAULT_TARGET_LANGUAGE);
        assert_eq!(cfg.refresh_interval(), DEFAULT_REFRESH_INTERVAL);
        assert_eq!(cfg.translate_url(), None);
    }

    #[test]
    fn env_values_resolve_overrides() {
        let tmp = TempDir::new().unwrap();
        let cfg = EnvValues {
            data_dir: Some(tmp.path().display().to_string()),
            template_dir: Some(tmp.path().display().to_string()),
            target_language: Some("DE".into()),
            refresh_secs: Some("3".into()),
            translate_url: Some("http://translate.local".into()),
        }
        .resolve()
        .unwrap();
        assert_eq!(cfg.data_dir(), tmp.path());
        assert_eq!(cfg.template_dir(), Some(tmp.path()));
        assert_eq!(cfg.target_language(), "de");
        assert_eq!(cfg.refresh_interval(), Duration::from_secs(3));
        assert_eq!(cfg.translate_url(), Some("http://translate.local"));

        let bad = EnvValues {
            refresh_secs: Some("-1".into()),
            ..EnvValues::default()
        };
        assert!(matches!(bad.resolve(), Err(FeedbackError::InvalidInput(_))));
    }
}
