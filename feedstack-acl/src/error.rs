use feedstack_adapter::FeedError;
use feedstack_model::CodecError;
use thiserror::Error;

use crate::ACCESS_CONTROL_WRAPPER;

pub type AclResult<T> = Result<T, AclError>;

/// Errors raised while reading an ACL document.
#[derive(Debug, Error)]
pub enum AclError {
    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("invalid ACL rule: {0}")]
    InvalidRule(String),
}

impl From<AclError> for FeedError {
    fn from(e: AclError) -> Self {
        FeedError::Construction {
            implementation: ACCESS_CONTROL_WRAPPER.to_string(),
            reason: e.to_string(),
        }
    }
}
