//! Config store abstraction.
//!
//! A store hands out the declarative records for one deployment, grouped
//! by namespace. Stores may hit the filesystem or a database, so every
//! lookup is async.

use std::sync::Arc;

use async_trait::async_trait;

use crate::adapter::{AdapterConfig, FeedConfig};
use crate::error::ConfigResult;

/// Prefix marking a wrapper config that refers to a store resource.
pub const RESOURCE_PREFIX: char = '@';

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Adapter record `name` of `namespace`.
    async fn adapter_config(&self, namespace: &str, name: &str) -> ConfigResult<Arc<AdapterConfig>>;

    /// Names of all adapters in `namespace`, sorted.
    async fn adapter_names(&self, namespace: &str) -> ConfigResult<Vec<String>>;

    /// Feed record `feed_id` of `namespace`.
    async fn feed_config(&self, namespace: &str, feed_id: &str) -> ConfigResult<FeedConfig>;

    /// Ids of all feeds in `namespace`, sorted.
    async fn feed_ids(&self, namespace: &str) -> ConfigResult<Vec<String>>;

    /// An auxiliary document (e.g. an ACL file) at `path` relative to the
    /// namespace's adapter configuration.
    async fn resource(&self, namespace: &str, path: &str) -> ConfigResult<String>;

    /// Returns `config` unless it has the form `@path`, in which case the
    /// resource at `path` is loaded instead.
    async fn expand_payload(&self, namespace: &str, config: &str) -> ConfigResult<String> {
        match config.trim().strip_prefix(RESOURCE_PREFIX) {
            Some(path) => self.resource(namespace, path.trim()).await,
            None => Ok(config.to_string()),
        }
    }
}
