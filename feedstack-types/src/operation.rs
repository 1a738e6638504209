//! The CRUD verbs an adapter call is classified under.

use std::fmt;
use std::str::FromStr;

/// An operation as named in access rules.
///
/// `retrieve` covers both feed listing and single-entry reads; the
/// [`ResourcePath`](crate::ResourcePath) tells the two apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Create,
    Retrieve,
    Update,
    Delete,
}

impl Operation {
    /// All operations, in CRUD order.
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Retrieve,
        Operation::Update,
        Operation::Delete,
    ];

    /// The lowercase name used in configuration documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Retrieve => "retrieve",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "retrieve" => Ok(Self::Retrieve),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(crate::Error::UnknownOperation(s.to_string())),
        }
    }
}
