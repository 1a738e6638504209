//! Transparent decorators.

use std::sync::Arc;

use async_trait::async_trait;
use feedstack_model::Entity;
use feedstack_types::RequestContext;

use crate::adapter::{AdapterDescriptor, FeedAdapter};
use crate::error::FeedResult;

/// A decorator that forwards every call unchanged. Useful as a chain
/// placeholder and as the starting point for wrappers that only touch
/// some operations.
pub struct PassThroughWrapper {
    descriptor: AdapterDescriptor,
    inner: Arc<dyn FeedAdapter>,
}

impl PassThroughWrapper {
    pub fn new(id: impl Into<String>, inner: Arc<dyn FeedAdapter>, config: Option<String>) -> Self {
        Self {
            descriptor: AdapterDescriptor::wrapper(id, config),
            inner,
        }
    }

    /// The configuration payload this wrapper was built with.
    pub fn config(&self) -> Option<&str> {
        self.descriptor.config.as_deref()
    }
}

#[async_trait]
impl FeedAdapter for PassThroughWrapper {
    async fn retrieve_feed(&self, ctx: &RequestContext) -> FeedResult<Vec<Entity>> {
        self.inner.retrieve_feed(ctx).await
    }

    async fn retrieve_entry(&self, ctx: &RequestContext, entry_id: &str) -> FeedResult<Entity> {
        self.inner.retrieve_entry(ctx, entry_id).await
    }

    async fn create_entry(&self, ctx: &RequestContext, entry: Entity) -> FeedResult<Entity> {
        self.inner.create_entry(ctx, entry).await
    }

    async fn update_entry(
        &self,
        ctx: &RequestContext,
        entry_id: &str,
        entry: Entity,
    ) -> FeedResult<Entity> {
        self.inner.update_entry(ctx, entry_id, entry).await
    }

    async fn delete_entry(&self, ctx: &RequestContext, entry_id: &str) -> FeedResult<()> {
        self.inner.delete_entry(ctx, entry_id).await
    }

    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn target(&self) -> Option<&dyn FeedAdapter> {
        Some(self.inner.as_ref())
    }
}

/// Separates an indirection record's decorators from the fully resolved
/// chain of the adapter it redirects to. Forwards every call.
pub struct ChainBoundary {
    descriptor: AdapterDescriptor,
    inner: Arc<dyn FeedAdapter>,
}

impl ChainBoundary {
    pub fn new(target_name: impl Into<String>, inner: Arc<dyn FeedAdapter>) -> Self {
        Self {
            descriptor: AdapterDescriptor::boundary(target_name),
            inner,
        }
    }

    /// The shared, cached chain on the far side of the boundary.
    pub fn resolved_target(&self) -> &Arc<dyn FeedAdapter> {
        &self.inner
    }
}

#[async_trait]
impl FeedAdapter for ChainBoundary {
    async fn retrieve_feed(&self, ctx: &RequestContext) -> FeedResult<Vec<Entity>> {
        self.inner.retrieve_feed(ctx).await
    }

    async fn retrieve_entry(&self, ctx: &RequestContext, entry_id: &str) -> FeedResult<Entity> {
        self.inner.retrieve_entry(ctx, entry_id).await
    }

    async fn create_entry(&self, ctx: &RequestContext, entry: Entity) -> FeedResult<Entity> {
        self.inner.create_entry(ctx, entry).await
    }

    async fn update_entry(
        &self,
        ctx: &RequestContext,
        entry_id: &str,
        entry: Entity,
    ) -> FeedResult<Entity> {
        self.inner.update_entry(ctx, entry_id, entry).await
    }

    async fn delete_entry(&self, ctx: &RequestContext, entry_id: &str) -> FeedResult<()> {
        self.inner.delete_entry(ctx, entry_id).await
    }

    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn target(&self) -> Option<&dyn FeedAdapter> {
        Some(self.inner.as_ref())
    }
}
