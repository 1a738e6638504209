//! The adapter contract.
//!
//! Base adapters and decorators implement the same trait, so a chain of
//! any depth is called exactly like a single adapter.

use std::fmt;

use async_trait::async_trait;
use feedstack_model::Entity;
use feedstack_types::RequestContext;

use crate::error::FeedResult;

/// Where an adapter sits in a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    /// Talks to storage.
    Base,
    /// Decorates an inner adapter.
    Wrapper,
    /// Marks where an indirection record hands over to the chain of the
    /// adapter it redirects to.
    Boundary,
}

/// Introspection data reported by every adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterDescriptor {
    pub kind: AdapterKind,
    /// Registry id (or, for boundaries, the adapter name crossed into).
    pub implementation: String,
    /// Configuration payload the adapter was built with.
    pub config: Option<String>,
}

impl AdapterDescriptor {
    pub fn base(implementation: impl Into<String>, config: Option<String>) -> Self {
        Self {
            kind: AdapterKind::Base,
            implementation: implementation.into(),
            config,
        }
    }

    pub fn wrapper(implementation: impl Into<String>, config: Option<String>) -> Self {
        Self {
            kind: AdapterKind::Wrapper,
            implementation: implementation.into(),
            config,
        }
    }

    pub fn boundary(target: impl Into<String>) -> Self {
        Self {
            kind: AdapterKind::Boundary,
            implementation: target.into(),
            config: None,
        }
    }
}

impl fmt::Display for AdapterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            AdapterKind::Base => write!(f, "base({})", self.implementation),
            AdapterKind::Wrapper => write!(f, "{}", self.implementation),
            AdapterKind::Boundary => write!(f, "[{}]", self.implementation),
        }
    }
}

/// CRUD operations on one feed.
#[async_trait]
pub trait FeedAdapter: Send + Sync {
    /// All entries of the feed.
    async fn retrieve_feed(&self, ctx: &RequestContext) -> FeedResult<Vec<Entity>>;

    async fn retrieve_entry(&self, ctx: &RequestContext, entry_id: &str) -> FeedResult<Entity>;

    /// Stores a new entry and returns it as stored.
    async fn create_entry(&self, ctx: &RequestContext, entry: Entity) -> FeedResult<Entity>;

    /// Replaces entry `entry_id` and returns it as stored.
    async fn update_entry(
        &self,
        ctx: &RequestContext,
        entry_id: &str,
        entry: Entity,
    ) -> FeedResult<Entity>;

    async fn delete_entry(&self, ctx: &RequestContext, entry_id: &str) -> FeedResult<()>;

    fn descriptor(&self) -> &AdapterDescriptor;

    /// The adapter this one delegates to, if it is a decorator.
    fn target(&self) -> Option<&dyn FeedAdapter> {
        None
    }
}

/// Descriptors of `adapter` and everything beneath it, outermost first.
pub fn adapter_chain(adapter: &dyn FeedAdapter) -> Vec<AdapterDescriptor> {
    let mut chain = Vec::new();
    let mut current = Some(adapter);
    while let Some(layer) = current {
        chain.push(layer.descriptor().clone());
        current = layer.target();
    }
    chain
}

/// Test doubles.
pub mod mock {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    use crate::error::FeedError;

    /// A base adapter that records which operations reached it and
    /// answers every call with an empty entity.
    pub struct RecordingAdapter {
        descriptor: AdapterDescriptor,
        calls: Mutex<Vec<String>>,
    }

    impl Default for RecordingAdapter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl RecordingAdapter {
        pub fn new() -> Self {
            Self {
                descriptor: AdapterDescriptor::base("recording", None),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Operations received so far, e.g. `["retrieve_entry:123"]`.
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
        }
    }

    #[async_trait]
    impl FeedAdapter for RecordingAdapter {
        async fn retrieve_feed(&self, _ctx: &RequestContext) -> FeedResult<Vec<Entity>> {
            self.record("retrieve_feed".to_string());
            Ok(Vec::new())
        }

        async fn retrieve_entry(&self, _ctx: &RequestContext, entry_id: &str) -> FeedResult<Entity> {
            self.record(format!("retrieve_entry:{entry_id}"));
            Ok(Entity::new())
        }

        async fn create_entry(&self, _ctx: &RequestContext, entry: Entity) -> FeedResult<Entity> {
            self.record("create_entry".to_string());
            Ok(entry)
        }

        async fn update_entry(
            &self,
            _ctx: &RequestContext,
            entry_id: &str,
            entry: Entity,
        ) -> FeedResult<Entity> {
            self.record(format!("update_entry:{entry_id}"));
            Ok(entry)
        }

        async fn delete_entry(&self, _ctx: &RequestContext, entry_id: &str) -> FeedResult<()> {
            self.record(format!("delete_entry:{entry_id}"));
            Ok(())
        }

        fn descriptor(&self) -> &AdapterDescriptor {
            &self.descriptor
        }
    }

    /// A base adapter whose every call fails with a backend error.
    pub struct FailingAdapter {
        descriptor: AdapterDescriptor,
    }

    impl Default for FailingAdapter {
        fn default() -> Self {
            Self {
                descriptor: AdapterDescriptor::base("failing", None),
            }
        }
    }

    #[async_trait]
    impl FeedAdapter for FailingAdapter {
        async fn retrieve_feed(&self, _ctx: &RequestContext) -> FeedResult<Vec<Entity>> {
            Err(FeedError::Backend("unavailable".into()))
        }

        async fn retrieve_entry(&self, _ctx: &RequestContext, _entry_id: &str) -> FeedResult<Entity> {
            Err(FeedError::Backend("unavailable".into()))
        }

        async fn create_entry(&self, _ctx: &RequestContext, _entry: Entity) -> FeedResult<Entity> {
            Err(FeedError::Backend("unavailable".into()))
        }

        async fn update_entry(
            &self,
            _ctx: &RequestContext,
            _entry_id: &str,
            _entry: Entity,
        ) -> FeedResult<Entity> {
            Err(FeedError::Backend("unavailable".into()))
        }

        async fn delete_entry(&self, _ctx: &RequestContext, _entry_id: &str) -> FeedResult<()> {
            Err(FeedError::Backend("unavailable".into()))
        }

        fn descriptor(&self) -> &AdapterDescriptor {
            &self.descriptor
        }
    }
}
