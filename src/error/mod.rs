//! Error types for webauth-flow.

use thiserror::Error;

/// Primary error type for all webauth-flow operations.
///
/// Platform errors reported by the hosting view are not represented here:
/// they go through [`crate::classify::ErrorClassifier`] and, when fatal, end
/// up in [`crate::flow::FlowResult::Failure`].
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("OAuth state mismatch: expected {expected}, got {actual}")]
    StateMismatch { expected: String, actual: String },

    #[error("Authorization denied: {error}")]
    AuthorizationDenied {
        error: String,
        description: Option<String>,
    },

    #[error("Missing parameter in redirect: {0}")]
    MissingParameter(&'static str),
}

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Configuration,
    Io,
    Serialization,
    Authorization,
}

impl FlowError {
    /// Wrap a URL parse failure together with the offending input.
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidState(_) => ErrorCategory::Usage,
            Self::Configuration(_) | Self::InvalidUrl { .. } => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Io,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::StateMismatch { .. }
            | Self::AuthorizationDenied { .. }
            | Self::MissingParameter(_) => ErrorCategory::Authorization,
        }
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for FlowError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for FlowError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FlowError>;
