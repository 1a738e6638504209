//! Access decisions against parsed ACL rules.

use std::fmt;

use feedstack_adapter::{FeedError, FeedResult};
use feedstack_types::{Operation, ResourcePath};
use tracing::{debug, info};

use crate::error::AclResult;
use crate::rules::AclRules;

/// Principal token admitting unauthenticated callers. An authenticated
/// viewer still has to be listed, or covered by [`DOMAIN_USERS`].
pub const ANYONE: &str = "*";

/// Principal token matching any authenticated caller whose domain is the
/// adapter's namespace.
pub const DOMAIN_USERS: &str = "DOMAIN_USERS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Denied(DenialReason),
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Neither the resource nor the feed has a rule.
    NoAclDefined,
    /// The resource has a rule, but not for this operation.
    NoAclForOperation,
    /// No viewer, and the principals do not include `*`.
    Unauthenticated,
    /// The viewer matches none of the principals.
    PrincipalNotListed,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoAclDefined => "no ACL defined",
            Self::NoAclForOperation => "no ACL defined for this operation",
            Self::Unauthenticated => "viewer unauthenticated",
            Self::PrincipalNotListed => "viewer not on list of principals",
        };
        f.write_str(reason)
    }
}

/// Immutable per-adapter access policy.
#[derive(Debug, Clone)]
pub struct AccessControlPolicy {
    namespace: String,
    rules: AclRules,
}

impl AccessControlPolicy {
    pub fn new(namespace: impl Into<String>, rules: AclRules) -> Self {
        Self {
            namespace: namespace.into(),
            rules,
        }
    }

    pub fn from_document(namespace: impl Into<String>, document: &str) -> AclResult<Self> {
        Ok(Self::new(namespace, AclRules::from_document(document)?))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn rules(&self) -> &AclRules {
        &self.rules
    }

    /// Decides whether `viewer` may perform `operation` on `path`.
    ///
    /// An entry path without a rule of its own falls back to the feed rule.
    /// An entry path that has a rule never falls back, even when that rule
    /// does not mention `operation`.
    pub fn evaluate(
        &self,
        operation: Operation,
        path: &ResourcePath,
        viewer: Option<&str>,
    ) -> AccessDecision {
        let Some(operations) = self.rules.resource(path) else {
            return match path {
                ResourcePath::Entry(_) => self.evaluate(operation, &ResourcePath::Feed, viewer),
                ResourcePath::Feed => AccessDecision::Denied(DenialReason::NoAclDefined),
            };
        };
        let Some(principals) = operations.get(&operation) else {
            return AccessDecision::Denied(DenialReason::NoAclForOperation);
        };

        match viewer {
            None if principals.contains(ANYONE) => AccessDecision::Granted,
            None => AccessDecision::Denied(DenialReason::Unauthenticated),
            Some(viewer)
                if principals.contains(viewer)
                    || (principals.contains(DOMAIN_USERS) && self.in_namespace(viewer)) =>
            {
                AccessDecision::Granted
            }
            Some(_) => AccessDecision::Denied(DenialReason::PrincipalNotListed),
        }
    }

    /// Like [`evaluate`](Self::evaluate), failing with
    /// [`FeedError::NotAuthorized`] on denial.
    pub fn check(
        &self,
        operation: Operation,
        path: &ResourcePath,
        viewer: Option<&str>,
    ) -> FeedResult<()> {
        match self.evaluate(operation, path, viewer) {
            AccessDecision::Granted => {
                debug!(%operation, %path, viewer = ?viewer, "Access granted");
                Ok(())
            }
            AccessDecision::Denied(reason) => {
                info!(%operation, %path, viewer = ?viewer, %reason, "Access denied");
                let who = viewer.map_or_else(|| "anonymous viewer".to_string(), |v| format!("viewer '{v}'"));
                Err(FeedError::NotAuthorized(format!(
                    "{reason} for '{operation},{path}' ({who})"
                )))
            }
        }
    }

    /// True when the viewer's email domain is the namespace or one of its
    /// subdomains.
    fn in_namespace(&self, viewer: &str) -> bool {
        let Some((_, domain)) = viewer.rsplit_once('@') else {
            return false;
        };
        let domain = domain.to_ascii_lowercase();
        let namespace = self.namespace.to_ascii_lowercase();
        !namespace.is_empty()
            && (domain == namespace
                || domain
                    .strip_suffix(namespace.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.')))
    }
}
