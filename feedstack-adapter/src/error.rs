//! Error types for adapter calls and chain resolution.

use feedstack_config::ConfigError;
use feedstack_model::CodecError;
use thiserror::Error;

/// Result type for adapter operations.
pub type FeedResult<T> = Result<T, FeedError>;

/// Errors surfaced to the protocol front end.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The requested entry does not exist.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// An access policy denied the call.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// Adapter or feed configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No factory is registered for an implementation id.
    #[error("no implementation registered for '{0}'")]
    ClassResolution(String),

    /// A factory rejected its configuration.
    #[error("failed to construct '{implementation}': {reason}")]
    Construction {
        implementation: String,
        reason: String,
    },

    /// An entity or config payload could not be decoded.
    #[error("document error: {0}")]
    Codec(#[from] CodecError),

    /// The entity submitted by the caller is unusable.
    #[error("invalid entry: {0}")]
    InvalidEntry(String),

    /// The storage behind an adapter failed.
    #[error("backend error: {0}")]
    Backend(String),
}

impl FeedError {
    /// True for failures to build an adapter chain. The protocol boundary
    /// reports these as "not found" rather than as server faults.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::ClassResolution(_) | Self::Construction { .. }
        )
    }

    pub fn is_not_authorized(&self) -> bool {
        matches!(self, Self::NotAuthorized(_))
    }

    pub(crate) fn construction(implementation: &str, cause: FeedError) -> Self {
        match cause {
            already @ Self::Construction { .. } => already,
            other => Self::Construction {
                implementation: implementation.to_string(),
                reason: other.to_string(),
            },
        }
    }
}
