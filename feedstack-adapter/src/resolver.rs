//! Builds and caches decorator chains from adapter configuration.
//!
//! Resolving an adapter name:
//!
//! 1. fetch its [`AdapterConfig`] from the config store
//! 2. build the base: either the registered base adapter for
//!    `implementation_id`, or, for an indirection record, the resolved chain
//!    of the adapter it redirects to behind a [`ChainBoundary`] and the
//!    record's own wrapper
//! 3. apply the wrapper list in declaration order, so the last listed
//!    wrapper ends up outermost
//! 4. cache the result; later calls return the same instance
//!
//! Construction for one name is single-flight. A failed construction
//! caches nothing.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use feedstack_config::{
    AdapterConfig, ConfigError, ConfigStore, MixinConfig, ServerConfig, ADAPTER_ROOT, MIXIN_ROOT,
};
use futures::future::BoxFuture;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::adapter::FeedAdapter;
use crate::error::{FeedError, FeedResult};
use crate::passthrough::ChainBoundary;
use crate::registry::{AdapterContext, AdapterRegistry};

/// A fully decorated adapter, shared by every caller resolving its name.
pub type ResolvedAdapter = Arc<dyn FeedAdapter>;

type Slot = Arc<OnceCell<ResolvedAdapter>>;

/// Resolves adapter names of one namespace into decorated chains.
pub struct ChainResolver {
    namespace: String,
    store: Arc<dyn ConfigStore>,
    registry: Arc<AdapterRegistry>,
    server: Arc<ServerConfig>,
    cache: RwLock<HashMap<String, Slot>>,
}

impl ChainResolver {
    pub fn new(
        namespace: impl Into<String>,
        store: Arc<dyn ConfigStore>,
        registry: Arc<AdapterRegistry>,
        server: Arc<ServerConfig>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            store,
            registry,
            server,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn server(&self) -> &Arc<ServerConfig> {
        &self.server
    }

    /// Returns the decorated chain for `adapter_name`, building it on first
    /// use.
    pub async fn resolve(&self, adapter_name: &str) -> FeedResult<ResolvedAdapter> {
        self.resolve_boxed(adapter_name).await
    }

    /// Resolves the adapter serving `feed_id`.
    pub async fn resolve_feed(&self, feed_id: &str) -> FeedResult<ResolvedAdapter> {
        let feed = self.store.feed_config(&self.namespace, feed_id).await?;
        self.resolve(&feed.adapter_name).await
    }

    /// Drops the cached chain for `adapter_name`. Chains that were built on
    /// top of it through indirection keep their existing instance.
    pub fn invalidate(&self, adapter_name: &str) -> bool {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(adapter_name)
            .is_some_and(|slot| slot.initialized())
    }

    pub fn invalidate_all(&self) {
        self.cache.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Number of names holding a cache slot, built or under construction.
    pub fn cache_len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_cached(&self, adapter_name: &str) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(adapter_name)
            .is_some_and(|slot| slot.initialized())
    }

    fn slot(&self, adapter_name: &str) -> Slot {
        if let Some(slot) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(adapter_name)
        {
            return slot.clone();
        }
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(adapter_name.to_string())
            .or_default()
            .clone()
    }

    /// Drops the slot of a failed construction unless another caller still
    /// holds it or a newer slot has replaced it.
    fn release(&self, adapter_name: &str, slot: &Slot) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let unused = cache.get(adapter_name).is_some_and(|current| {
            Arc::ptr_eq(current, slot) && !current.initialized() && Arc::strong_count(slot) == 2
        });
        if unused {
            cache.remove(adapter_name);
        }
    }

    // Boxed so indirection can recurse.
    fn resolve_boxed<'a>(&'a self, adapter_name: &'a str) -> BoxFuture<'a, FeedResult<ResolvedAdapter>> {
        Box::pin(async move {
            let slot = self.slot(adapter_name);
            if let Some(adapter) = slot.get() {
                debug!(adapter = %adapter_name, "Adapter cache hit");
                return Ok(adapter.clone());
            }

            match slot.get_or_try_init(|| self.construct(adapter_name)).await {
                Ok(adapter) => Ok(adapter.clone()),
                Err(e) => {
                    warn!(adapter = %adapter_name, namespace = %self.namespace, error = %e, "Adapter resolution failed");
                    self.release(adapter_name, &slot);
                    Err(e)
                }
            }
        })
    }

    async fn construct(&self, adapter_name: &str) -> FeedResult<ResolvedAdapter> {
        info!(adapter = %adapter_name, namespace = %self.namespace, "Constructing adapter chain");
        let config = self.store.adapter_config(&self.namespace, adapter_name).await?;
        let ctx = AdapterContext {
            namespace: self.namespace.clone(),
            adapter_name: adapter_name.to_string(),
            server: self.server.clone(),
        };

        let mut current = match self.indirection(&config).await? {
            Some(mixin) => self.build_indirection(&ctx, &config, &mixin).await?,
            None => self.build_base(&ctx, &config).await?,
        };

        for mixin in config.wrapper_chain(self.server.implicit_wrappers) {
            let wrapper_id = mixin
                .wrapper_class_id
                .as_deref()
                .ok_or(ConfigError::MissingField {
                    document: MIXIN_ROOT,
                    field: "wrapperName",
                })?;
            current = self
                .apply_wrapper(&ctx, current, wrapper_id, mixin.wrapper_config.as_deref())
                .await?;
        }

        debug!(adapter = %adapter_name, "Adapter chain constructed");
        Ok(current)
    }

    async fn build_base(&self, ctx: &AdapterContext, config: &AdapterConfig) -> FeedResult<ResolvedAdapter> {
        let id = config.implementation_id.as_str();
        let factory = self
            .registry
            .adapter_factory(id)
            .ok_or_else(|| FeedError::ClassResolution(id.to_string()))?;
        let payload = self.payload(config.raw_config.as_deref()).await?;
        factory
            .create(ctx, payload.as_deref())
            .map_err(|e| FeedError::construction(id, e))
    }

    async fn build_indirection(
        &self,
        ctx: &AdapterContext,
        config: &AdapterConfig,
        mixin: &MixinConfig,
    ) -> FeedResult<ResolvedAdapter> {
        let target = mixin
            .target_adapter_name
            .as_deref()
            .ok_or(ConfigError::MissingField {
                document: MIXIN_ROOT,
                field: "adapterName",
            })?;
        self.check_indirections(&config.name, target).await?;

        debug!(adapter = %config.name, target = %target, "Resolving indirection target");
        let resolved = self.resolve_boxed(target).await?;
        let boundary: ResolvedAdapter = Arc::new(ChainBoundary::new(target, resolved));

        let wrapper_id = mixin
            .wrapper_class_id
            .as_deref()
            .unwrap_or(config.implementation_id.as_str());
        self.apply_wrapper(ctx, boundary, wrapper_id, mixin.wrapper_config.as_deref())
            .await
    }

    async fn apply_wrapper(
        &self,
        ctx: &AdapterContext,
        inner: ResolvedAdapter,
        wrapper_id: &str,
        config: Option<&str>,
    ) -> FeedResult<ResolvedAdapter> {
        let factory = self
            .registry
            .wrapper_factory(wrapper_id)
            .ok_or_else(|| FeedError::ClassResolution(wrapper_id.to_string()))?;
        let payload = self.payload(config).await?;
        debug!(adapter = %ctx.adapter_name, wrapper = %wrapper_id, "Applying wrapper");
        factory
            .wrap(ctx, inner, payload.as_deref())
            .map_err(|e| FeedError::construction(wrapper_id, e))
    }

    /// Expands `@path` payloads into the referenced store resource.
    async fn payload(&self, config: Option<&str>) -> FeedResult<Option<String>> {
        match config {
            Some(raw) => Ok(Some(self.store.expand_payload(&self.namespace, raw).await?)),
            None => Ok(None),
        }
    }

    /// The redirect mixin of an indirection record, or `None` for a record
    /// describing a concrete base adapter.
    async fn indirection(&self, config: &AdapterConfig) -> FeedResult<Option<MixinConfig>> {
        if !config.is_wrapper && !self.registry.is_wrapper(&config.implementation_id) {
            return Ok(None);
        }
        let raw = config.raw_config.as_deref().ok_or(ConfigError::MissingField {
            document: ADAPTER_ROOT,
            field: "configValue",
        })?;
        let document = self.store.expand_payload(&self.namespace, raw).await?;
        Ok(Some(MixinConfig::from_document(&document)?))
    }

    /// Follows indirection records from `target` and fails if the walk
    /// returns to a name already visited. Runs before waiting on any cache
    /// slot, so a cycle is reported instead of deadlocking.
    async fn check_indirections(&self, origin: &str, target: &str) -> FeedResult<()> {
        let mut path = vec![origin.to_string()];
        let mut next = Some(target.to_string());
        while let Some(name) = next.take() {
            if path.contains(&name) {
                path.push(name);
                return Err(ConfigError::CyclicIndirection(path).into());
            }
            let config = self.store.adapter_config(&self.namespace, &name).await?;
            path.push(name);
            next = self
                .indirection(&config)
                .await?
                .and_then(|mixin| mixin.target_adapter_name);
        }
        Ok(())
    }
}
