use std::sync::Arc;

use async_trait::async_trait;
use feedstack_adapter::{AdapterContext, AdapterDescriptor, FeedAdapter, FeedResult};
use feedstack_model::Entity;
use feedstack_types::{Operation, RequestContext, ResourcePath};
use tracing::debug;

use crate::error::AclResult;
use crate::policy::AccessControlPolicy;
use crate::rules::AclRules;
use crate::ACCESS_CONTROL_WRAPPER;

/// Checks every call against an [`AccessControlPolicy`] before forwarding
/// it. Denied calls never reach the inner adapter.
pub struct AccessControlWrapper {
    descriptor: AdapterDescriptor,
    policy: AccessControlPolicy,
    enforced: bool,
    inner: Arc<dyn FeedAdapter>,
}

impl AccessControlWrapper {
    pub fn new(policy: AccessControlPolicy, inner: Arc<dyn FeedAdapter>) -> Self {
        Self {
            descriptor: AdapterDescriptor::wrapper(ACCESS_CONTROL_WRAPPER, None),
            policy,
            enforced: true,
            inner,
        }
    }

    /// Builds the wrapper a resolver asks for: rules come from `config`,
    /// the namespace from the adapter being built, and enforcement from the
    /// server settings. A missing `config` defines no rules, so every call
    /// is denied.
    pub fn from_config(
        ctx: &AdapterContext,
        inner: Arc<dyn FeedAdapter>,
        config: Option<&str>,
    ) -> AclResult<Self> {
        let rules = match config.filter(|c| !c.trim().is_empty()) {
            Some(document) => AclRules::from_document(document)?,
            None => AclRules::new(),
        };
        debug!(
            adapter = %ctx.adapter_name,
            resources = rules.resources().count(),
            "Loaded access rules"
        );
        let mut wrapper = Self::new(AccessControlPolicy::new(ctx.namespace.as_str(), rules), inner);
        wrapper.descriptor.config = config.map(str::to_string);
        wrapper.enforced = ctx.server.access_control_enabled;
        Ok(wrapper)
    }

    /// Turns enforcement off; every call is forwarded unchecked.
    #[must_use]
    pub fn unenforced(mut self) -> Self {
        self.enforced = false;
        self
    }

    pub fn policy(&self) -> &AccessControlPolicy {
        &self.policy
    }

    pub fn is_enforced(&self) -> bool {
        self.enforced
    }

    fn guard(&self, ctx: &RequestContext, operation: Operation, entry_id: Option<&str>) -> FeedResult<()> {
        if !self.enforced {
            return Ok(());
        }
        self.policy
            .check(operation, &ResourcePath::for_entry(entry_id), ctx.viewer())
    }
}

#[async_trait]
impl FeedAdapter for AccessControlWrapper {
    async fn retrieve_feed(&self, ctx: &RequestContext) -> FeedResult<Vec<Entity>> {
        self.guard(ctx, Operation::Retrieve, None)?;
        self.inner.retrieve_feed(ctx).await
    }

    async fn retrieve_entry(&self, ctx: &RequestContext, entry_id: &str) -> FeedResult<Entity> {
        self.guard(ctx, Operation::Retrieve, Some(entry_id))?;
        self.inner.retrieve_entry(ctx, entry_id).await
    }

    async fn create_entry(&self, ctx: &RequestContext, entry: Entity) -> FeedResult<Entity> {
        // The new entry has no id yet, so creation is a feed-level operation.
        self.guard(ctx, Operation::Create, None)?;
        self.inner.create_entry(ctx, entry).await
    }

    async fn update_entry(
        &self,
        ctx: &RequestContext,
        entry_id: &str,
        entry: Entity,
    ) -> FeedResult<Entity> {
        self.guard(ctx, Operation::Update, Some(entry_id))?;
        self.inner.update_entry(ctx, entry_id, entry).await
    }

    async fn delete_entry(&self, ctx: &RequestContext, entry_id: &str) -> FeedResult<()> {
        self.guard(ctx, Operation::Delete, Some(entry_id))?;
        self.inner.delete_entry(ctx, entry_id).await
    }

    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn target(&self) -> Option<&dyn FeedAdapter> {
        Some(self.inner.as_ref())
    }
}
