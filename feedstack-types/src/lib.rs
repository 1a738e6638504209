//! Core type definitions for feedstack.
//!
//! This crate defines the request-scoped vocabulary shared by every
//! adapter and wrapper in a decorator chain:
//! - [`Operation`]: the four CRUD verbs access rules are written against
//! - [`ResourcePath`]: `/` for feed-level calls, `/<entryId>` for entries
//! - [`RequestContext`]: namespace, feed and (optional) viewer of a call
//!
//! Nothing here knows about documents, configuration or storage; those
//! live in `feedstack-model`, `feedstack-config` and `feedstack-adapter`.

mod context;
mod operation;
mod resource;

pub use context::RequestContext;
pub use operation::Operation;
pub use resource::ResourcePath;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid resource path: {0:?}")]
    InvalidResourcePath(String),
}
