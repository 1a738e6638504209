//! Error types for configuration loading.

use feedstack_model::CodecError;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("adapter '{name}' is not registered in namespace '{namespace}'")]
    AdapterNotFound { namespace: String, name: String },

    #[error("feed '{feed_id}' is not configured in namespace '{namespace}'")]
    FeedNotFound { namespace: String, feed_id: String },

    #[error("config resource '{path}' not found in namespace '{namespace}'")]
    ResourceNotFound { namespace: String, path: String },

    #[error("{document} document is missing required field '{field}'")]
    MissingField {
        document: &'static str,
        field: &'static str,
    },

    #[error("expected <{expected}> document, found <{found}>")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },

    #[error("{document} field '{field}' must hold a single value")]
    RepeatedField {
        document: &'static str,
        field: &'static str,
    },

    #[error("invalid config name: {0:?}")]
    InvalidName(String),

    #[error("cyclic adapter indirection: {}", .0.join(" -> "))]
    CyclicIndirection(Vec<String>),

    #[error("invalid server settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("config store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config document error: {0}")]
    Codec(#[from] CodecError),
}
