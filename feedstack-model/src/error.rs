//! Error types for the document codec.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while decoding a document. Encoding never fails.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The markup itself is malformed (mismatched tags, bad syntax).
    #[error("malformed document at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    /// Text, CDATA or a name could not be decoded as UTF-8 or unescaped.
    #[error("invalid character data at byte {position}: {message}")]
    InvalidText { position: u64, message: String },

    /// The document ended with elements still open.
    #[error("unclosed element <{0}>")]
    Unclosed(String),

    /// An element holds both child elements and non-whitespace text.
    #[error("element <{0}> mixes text with child elements")]
    MixedContent(String),

    /// Non-whitespace text appeared outside any element.
    #[error("text outside of any element")]
    StrayText,

    /// `decode` needs exactly one root element.
    #[error("expected a single root element, found {0}")]
    RootCount(usize),

    /// The root element carried text instead of property elements.
    #[error("root element <{0}> has text content")]
    TextRoot(String),
}
