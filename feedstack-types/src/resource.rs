//! Resource paths used as keys into access rules.

use std::fmt;
use std::str::FromStr;

/// Either the feed as a whole (`/`) or one entry of it (`/<entryId>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourcePath {
    /// Feed-level resource, rendered as `/`.
    Feed,
    /// Entry-level resource, rendered as `/<entryId>`.
    Entry(String),
}

impl ResourcePath {
    /// Path for an optional entry id: `None` is the feed itself.
    pub fn for_entry(entry_id: Option<&str>) -> Self {
        match entry_id {
            Some(id) => Self::Entry(id.to_string()),
            None => Self::Feed,
        }
    }

    /// Returns true for the feed-level path.
    pub fn is_feed(&self) -> bool {
        matches!(self, Self::Feed)
    }

    /// The entry id, if this is an entry-level path.
    pub fn entry_id(&self) -> Option<&str> {
        match self {
            Self::Feed => None,
            Self::Entry(id) => Some(id),
        }
    }

    /// Parses `/` or `/<entryId>`. Anything without the leading slash,
    /// or with a nested segment, is rejected.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let trimmed = s.trim();
        match trimmed.strip_prefix('/') {
            Some("") => Ok(Self::Feed),
            Some(id) if !id.contains('/') => Ok(Self::Entry(id.to_string())),
            _ => Err(crate::Error::InvalidResourcePath(s.to_string())),
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feed => f.write_str("/"),
            Self::Entry(id) => write!(f, "/{id}"),
        }
    }
}

impl FromStr for ResourcePath {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
