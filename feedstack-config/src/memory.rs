//! In-process config store.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::adapter::{AdapterConfig, FeedConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::store::ConfigStore;

type Key = (String, String);

/// Config store backed by in-memory maps. Used by tests and by embedders
/// that assemble configuration in code.
#[derive(Default)]
pub struct MemoryConfigStore {
    adapters: RwLock<HashMap<Key, Arc<AdapterConfig>>>,
    feeds: RwLock<HashMap<Key, FeedConfig>>,
    resources: RwLock<HashMap<Key, String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an adapter record, keyed by its name.
    pub fn insert_adapter(&self, namespace: &str, config: AdapterConfig) {
        let key = (namespace.to_string(), config.name.clone());
        self.adapters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::new(config));
    }

    pub fn insert_feed(&self, namespace: &str, config: FeedConfig) {
        let key = (namespace.to_string(), config.feed_id.clone());
        self.feeds
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, config);
    }

    pub fn insert_resource(&self, namespace: &str, path: &str, contents: impl Into<String>) {
        let key = (namespace.to_string(), path.to_string());
        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, contents.into());
    }

    /// Builder-style [`insert_adapter`](Self::insert_adapter).
    #[must_use]
    pub fn with_adapter(self, namespace: &str, config: AdapterConfig) -> Self {
        self.insert_adapter(namespace, config);
        self
    }

    #[must_use]
    pub fn with_feed(self, namespace: &str, config: FeedConfig) -> Self {
        self.insert_feed(namespace, config);
        self
    }

    #[must_use]
    pub fn with_resource(self, namespace: &str, path: &str, contents: impl Into<String>) -> Self {
        self.insert_resource(namespace, path, contents);
        self
    }
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

fn sorted_names<V>(map: &HashMap<Key, V>, namespace: &str) -> Vec<String> {
    let mut names: Vec<String> = map
        .keys()
        .filter(|(ns, _)| ns == namespace)
        .map(|(_, name)| name.clone())
        .collect();
    names.sort();
    names
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn adapter_config(&self, namespace: &str, name: &str) -> ConfigResult<Arc<AdapterConfig>> {
        self.adapters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| ConfigError::AdapterNotFound {
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    async fn adapter_names(&self, namespace: &str) -> ConfigResult<Vec<String>> {
        let adapters = self.adapters.read().unwrap_or_else(PoisonError::into_inner);
        Ok(sorted_names(&adapters, namespace))
    }

    async fn feed_config(&self, namespace: &str, feed_id: &str) -> ConfigResult<FeedConfig> {
        self.feeds
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(namespace, feed_id))
            .cloned()
            .ok_or_else(|| ConfigError::FeedNotFound {
                namespace: namespace.to_string(),
                feed_id: feed_id.to_string(),
            })
    }

    async fn feed_ids(&self, namespace: &str) -> ConfigResult<Vec<String>> {
        let feeds = self.feeds.read().unwrap_or_else(PoisonError::into_inner);
        Ok(sorted_names(&feeds, namespace))
    }

    async fn resource(&self, namespace: &str, path: &str) -> ConfigResult<String> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key(namespace, path))
            .cloned()
            .ok_or_else(|| ConfigError::ResourceNotFound {
                namespace: namespace.to_string(),
                path: path.to_string(),
            })
    }
}
