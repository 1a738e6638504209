//! Filesystem config store.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/<namespace>/AdapterConfig/<adapter>.xml
//! <root>/<namespace>/AdapterConfig/<resource path>
//! <root>/<namespace>/FeedConfig/<feed id>.xml
//! ```

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::adapter::{AdapterConfig, FeedConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::store::ConfigStore;

const ADAPTER_DIR: &str = "AdapterConfig";
const FEED_DIR: &str = "FeedConfig";
const EXTENSION: &str = "xml";

pub struct FileSystemConfigStore {
    root: PathBuf,
}

impl FileSystemConfigStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn namespace_dir(&self, namespace: &str) -> ConfigResult<PathBuf> {
        Ok(self.root.join(single_component(namespace)?))
    }

    fn adapter_path(&self, namespace: &str, name: &str) -> ConfigResult<PathBuf> {
        let file = format!("{}.{EXTENSION}", single_component(name)?);
        Ok(self.namespace_dir(namespace)?.join(ADAPTER_DIR).join(file))
    }

    fn feed_path(&self, namespace: &str, feed_id: &str) -> ConfigResult<PathBuf> {
        let file = format!("{}.{EXTENSION}", single_component(feed_id)?);
        Ok(self.namespace_dir(namespace)?.join(FEED_DIR).join(file))
    }

    fn resource_path(&self, namespace: &str, path: &str) -> ConfigResult<PathBuf> {
        let relative = Path::new(path);
        let mut components = relative.components().peekable();
        if components.peek().is_none() {
            return Err(ConfigError::InvalidName(path.to_string()));
        }
        if !components.all(|c| matches!(c, Component::Normal(_))) {
            return Err(ConfigError::InvalidName(path.to_string()));
        }
        Ok(self.namespace_dir(namespace)?.join(ADAPTER_DIR).join(relative))
    }
}

/// Accepts a name only if it maps to exactly one path component inside
/// its parent directory.
fn single_component(name: &str) -> ConfigResult<&str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(name),
        _ => Err(ConfigError::InvalidName(name.to_string())),
    }
}

/// Reads `path`, mapping a missing file to `missing()`.
async fn read_or(path: &Path, missing: impl FnOnce() -> ConfigError) -> ConfigResult<String> {
    debug!("Reading config file {:?}", path);
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(missing()),
        Err(e) => Err(ConfigError::Io(e)),
    }
}

/// File stems of `*.xml` files in `dir`, sorted. A missing directory
/// lists as empty.
async fn list_stems(dir: &Path) -> ConfigResult<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ConfigError::Io(e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
            continue;
        }
        match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => names.push(stem.to_string()),
            None => warn!("Skipping config file with non UTF-8 name {:?}", path),
        }
    }
    names.sort();
    Ok(names)
}

#[async_trait]
impl ConfigStore for FileSystemConfigStore {
    async fn adapter_config(&self, namespace: &str, name: &str) -> ConfigResult<Arc<AdapterConfig>> {
        let path = self.adapter_path(namespace, name)?;
        let document = read_or(&path, || ConfigError::AdapterNotFound {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
        .await?;
        let config = AdapterConfig::from_document(&document)?;
        if config.name != name {
            warn!(
                "Adapter file {:?} declares name '{}'; it is served as '{}'",
                path, config.name, name
            );
        }
        Ok(Arc::new(AdapterConfig {
            name: name.to_string(),
            ..config
        }))
    }

    async fn adapter_names(&self, namespace: &str) -> ConfigResult<Vec<String>> {
        list_stems(&self.namespace_dir(namespace)?.join(ADAPTER_DIR)).await
    }

    async fn feed_config(&self, namespace: &str, feed_id: &str) -> ConfigResult<FeedConfig> {
        let path = self.feed_path(namespace, feed_id)?;
        let document = read_or(&path, || ConfigError::FeedNotFound {
            namespace: namespace.to_string(),
            feed_id: feed_id.to_string(),
        })
        .await?;
        FeedConfig::from_document(feed_id, &document)
    }

    async fn feed_ids(&self, namespace: &str) -> ConfigResult<Vec<String>> {
        list_stems(&self.namespace_dir(namespace)?.join(FEED_DIR)).await
    }

    async fn resource(&self, namespace: &str, path: &str) -> ConfigResult<String> {
        let file = self.resource_path(namespace, path)?;
        read_or(&file, || ConfigError::ResourceNotFound {
            namespace: namespace.to_string(),
            path: path.to_string(),
        })
        .await
    }
}
