//! In-process base adapter.

use async_trait::async_trait;
use feedstack_model::{decode, Entity, PropertyValue};
use feedstack_types::RequestContext;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::adapter::{AdapterDescriptor, FeedAdapter};
use crate::error::{FeedError, FeedResult};
use crate::registry::MEMORY_ADAPTER;

/// Property holding an entry's id.
pub const ID_PROPERTY: &str = "id";

const ENTRY: &str = "entry";

/// Keeps a feed's entries in memory, in insertion order.
///
/// The configuration payload may seed the feed:
///
/// ```xml
/// <feed>
///   <entry repeatable="true"><id>1</id><name>Ada</name></entry>
///   <entry><id>2</id><name>Grace</name></entry>
/// </feed>
/// ```
pub struct MemoryAdapter {
    descriptor: AdapterDescriptor,
    entries: RwLock<Vec<(String, Entity)>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor::base(MEMORY_ADAPTER, None),
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Builds an adapter seeded from `config`. Every seeded entry must carry
    /// a unique `id`.
    pub fn from_config(config: Option<&str>) -> FeedResult<Self> {
        let mut entries: Vec<(String, Entity)> = Vec::new();
        if let Some(document) = config.filter(|c| !c.trim().is_empty()) {
            let feed = decode(document)?;
            for item in feed.get(ENTRY).map(PropertyValue::items).into_iter().flatten() {
                let entry = match item {
                    PropertyValue::Group(entry) => entry.clone(),
                    _ => return Err(FeedError::InvalidEntry("seed entry has no properties".into())),
                };
                let id = entry_id(&entry)
                    .ok_or_else(|| FeedError::InvalidEntry("seed entry has no id".into()))?;
                if entries.iter().any(|(existing, _)| *existing == id) {
                    return Err(FeedError::InvalidEntry(format!("duplicate seed entry id '{id}'")));
                }
                entries.push((id, entry));
            }
        }
        debug!("Seeded memory adapter with {} entries", entries.len());
        Ok(Self {
            descriptor: AdapterDescriptor::base(MEMORY_ADAPTER, config.map(str::to_string)),
            entries: RwLock::new(entries),
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn entry_id(entry: &Entity) -> Option<String> {
    entry
        .get_str(ID_PROPERTY)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl FeedAdapter for MemoryAdapter {
    async fn retrieve_feed(&self, _ctx: &RequestContext) -> FeedResult<Vec<Entity>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|(_, entry)| entry.clone()).collect())
    }

    async fn retrieve_entry(&self, _ctx: &RequestContext, entry_id: &str) -> FeedResult<Entity> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .find(|(id, _)| id == entry_id)
            .map(|(_, entry)| entry.clone())
            .ok_or_else(|| FeedError::NotFound(entry_id.to_string()))
    }

    async fn create_entry(&self, _ctx: &RequestContext, mut entry: Entity) -> FeedResult<Entity> {
        let id = match entry_id(&entry) {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                entry.insert(ID_PROPERTY, id.as_str());
                id
            }
        };

        let mut entries = self.entries.write().await;
        if entries.iter().any(|(existing, _)| *existing == id) {
            return Err(FeedError::InvalidEntry(format!("entry '{id}' already exists")));
        }
        entries.push((id, entry.clone()));
        Ok(entry)
    }

    async fn update_entry(
        &self,
        _ctx: &RequestContext,
        entry_id: &str,
        mut entry: Entity,
    ) -> FeedResult<Entity> {
        entry.insert(ID_PROPERTY, entry_id);
        let mut entries = self.entries.write().await;
        let slot = entries
            .iter_mut()
            .find(|(id, _)| id == entry_id)
            .ok_or_else(|| FeedError::NotFound(entry_id.to_string()))?;
        slot.1 = entry.clone();
        Ok(entry)
    }

    async fn delete_entry(&self, _ctx: &RequestContext, entry_id: &str) -> FeedResult<()> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(id, _)| id != entry_id);
        if entries.len() == before {
            return Err(FeedError::NotFound(entry_id.to_string()));
        }
        Ok(())
    }

    fn descriptor(&self) -> &AdapterDescriptor {
        &self.descriptor
    }
}
