//! Access control for feedstack adapter chains.
//!
//! The `access-control` wrapper reads an ACL document mapping resource
//! paths (`/` for the feed, `/<entryId>` for one entry) to the principals
//! allowed each operation, and refuses calls whose viewer is not listed.
//! Principals are exact viewer ids, `*` (unauthenticated callers) or
//! `DOMAIN_USERS` (authenticated viewers of the adapter's namespace).
//!
//! ```ignore
//! let mut registry = AdapterRegistry::with_builtins();
//! feedstack_acl::register(&mut registry);
//! ```

mod error;
mod policy;
mod rules;
mod wrapper;

use std::sync::Arc;

use feedstack_adapter::{AdapterContext, AdapterRegistry, FeedAdapter};

pub use error::{AclError, AclResult};
pub use policy::{AccessControlPolicy, AccessDecision, DenialReason, ANYONE, DOMAIN_USERS};
pub use rules::{AclRules, OperationPrincipals};
pub use wrapper::AccessControlWrapper;

/// Registry id of [`AccessControlWrapper`].
pub const ACCESS_CONTROL_WRAPPER: &str = "access-control";

/// Installs the access-control wrapper factory.
pub fn register(registry: &mut AdapterRegistry) -> &mut AdapterRegistry {
    registry.register_wrapper(
        ACCESS_CONTROL_WRAPPER,
        |ctx: &AdapterContext, inner: Arc<dyn FeedAdapter>, config: Option<&str>| {
            Ok(Arc::new(AccessControlWrapper::from_config(ctx, inner, config)?))
        },
    )
}
