#[allow(clippy::single_component_path_imports)]
use serde_yaml;

#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid survey answer: {0}")]
    Validation(String),
    #[error("unknown survey template: {0}")]
    UnknownTemplate(String),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to open feedback log: {0}")]
    FileOpen(std::io::Error),
    #[error("failed to write feedback log: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize feedback record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),

    #[error("language detection failed: {0}")]
    LanguageDetection(String),
    #[error("translation failed: {0}")]
    Translation(String),

    #[error("feedback store lock poisoned")]
    LockPoisoned,
}

impl FeedbackError {
    /// True for errors caused by the submitted answers rather than the service.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FeedbackError::Validation(_) | FeedbackError::UnknownTemplate(_)
        )
    }

    /// True for failures of the durable feedback log.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            FeedbackError::StorageDirCreation(_)
                | FeedbackError::FileOpen(_)
                | FeedbackError::FileWrite(_)
                | FeedbackError::Serialization(_)
        )
    }
}

impl From<pulse_types::TextError> for FeedbackError {
    fn from(e: pulse_types::TextError) -> Self {
        FeedbackError::InvalidInput(e.to_string())
    }
}

pub type FeedbackResult<T> = std::result::Result<T, FeedbackError>;
