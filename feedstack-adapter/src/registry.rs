//! Registration table mapping implementation ids to factories.

use std::collections::HashMap;
use std::sync::Arc;

use feedstack_config::ServerConfig;

use crate::adapter::FeedAdapter;
use crate::error::FeedResult;
use crate::memory::MemoryAdapter;
use crate::passthrough::PassThroughWrapper;

/// Registry id of [`MemoryAdapter`].
pub const MEMORY_ADAPTER: &str = "memory";

/// Registry id of [`PassThroughWrapper`].
pub const PASSTHROUGH_WRAPPER: &str = "passthrough";

/// What a factory knows about the adapter it is building.
#[derive(Debug, Clone)]
pub struct AdapterContext {
    pub namespace: String,
    /// Name of the adapter record whose chain is being built.
    pub adapter_name: String,
    pub server: Arc<ServerConfig>,
}

/// Builds a base adapter from its configuration payload.
pub trait AdapterFactory: Send + Sync {
    fn create(&self, ctx: &AdapterContext, config: Option<&str>) -> FeedResult<Arc<dyn FeedAdapter>>;
}

/// Builds a decorator around `inner` from its configuration payload.
pub trait WrapperFactory: Send + Sync {
    fn wrap(
        &self,
        ctx: &AdapterContext,
        inner: Arc<dyn FeedAdapter>,
        config: Option<&str>,
    ) -> FeedResult<Arc<dyn FeedAdapter>>;
}

impl<F> AdapterFactory for F
where
    F: Fn(&AdapterContext, Option<&str>) -> FeedResult<Arc<dyn FeedAdapter>> + Send + Sync,
{
    fn create(&self, ctx: &AdapterContext, config: Option<&str>) -> FeedResult<Arc<dyn FeedAdapter>> {
        self(ctx, config)
    }
}

impl<F> WrapperFactory for F
where
    F: Fn(&AdapterContext, Arc<dyn FeedAdapter>, Option<&str>) -> FeedResult<Arc<dyn FeedAdapter>>
        + Send
        + Sync,
{
    fn wrap(
        &self,
        ctx: &AdapterContext,
        inner: Arc<dyn FeedAdapter>,
        config: Option<&str>,
    ) -> FeedResult<Arc<dyn FeedAdapter>> {
        self(ctx, inner, config)
    }
}

/// Explicit table of the implementations a resolver may instantiate.
/// Base adapter ids and wrapper ids live in separate namespaces.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn AdapterFactory>>,
    wrappers: HashMap<String, Arc<dyn WrapperFactory>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the in-process `memory` adapter and the
    /// `passthrough` wrapper.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_adapter(MEMORY_ADAPTER, |_ctx: &AdapterContext, config: Option<&str>| {
            Ok(Arc::new(MemoryAdapter::from_config(config)?))
        });
        registry.register_wrapper(
            PASSTHROUGH_WRAPPER,
            |_ctx: &AdapterContext, inner: Arc<dyn FeedAdapter>, config: Option<&str>| {
                Ok(Arc::new(PassThroughWrapper::new(
                    PASSTHROUGH_WRAPPER,
                    inner,
                    config.map(str::to_string),
                )))
            },
        );
        registry
    }

    /// Registers a base adapter factory closure, replacing any previous
    /// factory with the same id.
    pub fn register_adapter<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&AdapterContext, Option<&str>) -> FeedResult<Arc<dyn FeedAdapter>> + Send + Sync + 'static,
    {
        self.register_adapter_factory(id, Arc::new(factory))
    }

    /// Registers a wrapper factory closure, replacing any previous factory
    /// with the same id.
    pub fn register_wrapper<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&AdapterContext, Arc<dyn FeedAdapter>, Option<&str>) -> FeedResult<Arc<dyn FeedAdapter>>
            + Send
            + Sync
            + 'static,
    {
        self.register_wrapper_factory(id, Arc::new(factory))
    }

    pub fn register_adapter_factory(
        &mut self,
        id: impl Into<String>,
        factory: Arc<dyn AdapterFactory>,
    ) -> &mut Self {
        self.adapters.insert(id.into(), factory);
        self
    }

    pub fn register_wrapper_factory(
        &mut self,
        id: impl Into<String>,
        factory: Arc<dyn WrapperFactory>,
    ) -> &mut Self {
        self.wrappers.insert(id.into(), factory);
        self
    }

    pub fn adapter_factory(&self, id: &str) -> Option<Arc<dyn AdapterFactory>> {
        self.adapters.get(id).cloned()
    }

    pub fn wrapper_factory(&self, id: &str) -> Option<Arc<dyn WrapperFactory>> {
        self.wrappers.get(id).cloned()
    }

    pub fn is_wrapper(&self, id: &str) -> bool {
        self.wrappers.contains_key(id)
    }

    /// Registered base adapter ids, sorted.
    pub fn adapter_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Registered wrapper ids, sorted.
    pub fn wrapper_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.wrappers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
