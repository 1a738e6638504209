//! Adapter and feed configuration records.

use std::borrow::Cow;

use feedstack_model::{decode_element, encode_with_root, Entity, PropertyValue};

use crate::error::{ConfigError, ConfigResult};
use crate::mixin::{payload_text, text_field, MixinConfig, MIXIN_ROOT};
use crate::settings::ImplicitWrapperPolicy;

/// Root element of an adapter configuration document.
pub const ADAPTER_ROOT: &str = "adapter";

/// Root element of a feed configuration document.
pub const FEED_ROOT: &str = "feed";

const NAME: &str = "name";
const TYPE: &str = "type";
const TYPE_ALIAS: &str = "adapterClassName";
const CONFIG_VALUE: &str = "configValue";
const MIXINS: &str = "mixins";
const IMPLICIT_MIXINS: &str = "implicitMixins";
const IS_WRAPPER: &str = "isWrapper";
const ADAPTER_NAME: &str = "adapterName";

/// Declarative record for one named adapter.
///
/// ```xml
/// <adapter>
///   <name>contacts</name>
///   <type>memory</type>
///   <configValue>...</configValue>
///   <mixins repeatable="true"><wrapperName>access-control</wrapperName>...</mixins>
///   <implicitMixins repeatable="true">...</implicitMixins>
/// </adapter>
/// ```
///
/// Records are immutable once loaded; callers wanting a variant derive one
/// (see [`without_implicit_wrappers`](Self::without_implicit_wrappers)).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub name: String,
    /// Registry id of the base adapter, or of a wrapper for indirection
    /// records.
    pub implementation_id: String,
    /// Configuration payload handed to the implementation. For indirection
    /// records this is a mixin document.
    pub raw_config: Option<String>,
    /// Innermost first.
    pub explicit_wrappers: Vec<MixinConfig>,
    /// Innermost first.
    pub implicit_wrappers: Vec<MixinConfig>,
    /// Marks an indirection record.
    pub is_wrapper: bool,
}

impl AdapterConfig {
    pub fn new(name: impl Into<String>, implementation_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            implementation_id: implementation_id.into(),
            raw_config: None,
            explicit_wrappers: Vec::new(),
            implicit_wrappers: Vec::new(),
            is_wrapper: false,
        }
    }

    /// An indirection record: `name` resolves to `target`, decorated with
    /// `wrapper_id` configured by `wrapper_config`.
    pub fn indirection(
        name: impl Into<String>,
        wrapper_id: impl Into<String>,
        target: impl Into<String>,
        wrapper_config: Option<String>,
    ) -> Self {
        let wrapper_id = wrapper_id.into();
        let mixin = MixinConfig::redirect(target).with_wrapper(wrapper_id.clone(), wrapper_config);
        Self {
            raw_config: Some(mixin.to_document()),
            is_wrapper: true,
            ..Self::new(name, wrapper_id)
        }
    }

    #[must_use]
    pub fn with_config(mut self, raw_config: impl Into<String>) -> Self {
        self.raw_config = Some(raw_config.into());
        self
    }

    #[must_use]
    pub fn with_wrapper(mut self, mixin: MixinConfig) -> Self {
        self.explicit_wrappers.push(mixin);
        self
    }

    #[must_use]
    pub fn with_implicit_wrapper(mut self, mixin: MixinConfig) -> Self {
        self.implicit_wrappers.push(mixin);
        self
    }

    pub fn from_document(document: &str) -> ConfigResult<Self> {
        let (root, entity) = decode_element(document)?;
        if root != ADAPTER_ROOT {
            return Err(ConfigError::UnexpectedRoot {
                expected: ADAPTER_ROOT,
                found: root,
            });
        }
        Self::from_entity(&entity)
    }

    pub fn from_entity(entity: &Entity) -> ConfigResult<Self> {
        let name = text_field(entity, NAME).ok_or(ConfigError::MissingField {
            document: ADAPTER_ROOT,
            field: NAME,
        })?;
        let implementation_id = text_field(entity, TYPE)
            .or_else(|| text_field(entity, TYPE_ALIAS))
            .ok_or(ConfigError::MissingField {
                document: ADAPTER_ROOT,
                field: TYPE,
            })?;
        let is_wrapper = entity
            .get_str(IS_WRAPPER)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        Ok(Self {
            name,
            implementation_id,
            raw_config: payload_text(entity, ADAPTER_ROOT, CONFIG_VALUE)?,
            explicit_wrappers: mixin_list(entity, MIXINS)?,
            implicit_wrappers: mixin_list(entity, IMPLICIT_MIXINS)?,
            is_wrapper,
        })
    }

    pub fn to_entity(&self) -> Entity {
        let mut entity = Entity::new()
            .with(NAME, self.name.as_str())
            .with(TYPE, self.implementation_id.as_str());
        if let Some(config) = &self.raw_config {
            entity.insert(CONFIG_VALUE, config.as_str());
        }
        if self.is_wrapper {
            entity.insert(IS_WRAPPER, "true");
        }
        if !self.explicit_wrappers.is_empty() {
            entity.insert(MIXINS, mixin_values(&self.explicit_wrappers));
        }
        if !self.implicit_wrappers.is_empty() {
            entity.insert(IMPLICIT_MIXINS, mixin_values(&self.implicit_wrappers));
        }
        entity
    }

    pub fn to_document(&self) -> String {
        encode_with_root(&self.to_entity(), ADAPTER_ROOT)
    }

    /// A view of this record with the implicit wrapper list removed. The
    /// stored record is never touched; nothing is cloned when the list is
    /// already empty.
    pub fn without_implicit_wrappers(&self) -> Cow<'_, AdapterConfig> {
        if self.implicit_wrappers.is_empty() {
            return Cow::Borrowed(self);
        }
        Cow::Owned(Self {
            implicit_wrappers: Vec::new(),
            ..self.clone()
        })
    }

    /// The wrappers to apply for `policy`, innermost first.
    pub fn wrapper_chain(&self, policy: ImplicitWrapperPolicy) -> Vec<&MixinConfig> {
        let explicit = self.explicit_wrappers.iter();
        let implicit = self.implicit_wrappers.iter();
        match policy {
            ImplicitWrapperPolicy::Skip => explicit.collect(),
            ImplicitWrapperPolicy::Before => implicit.chain(explicit).collect(),
            ImplicitWrapperPolicy::After => explicit.chain(implicit).collect(),
        }
    }
}

/// Every entry of a mixin list must be a mixin element. A bare text entry
/// names no `wrapperName` field and is rejected rather than skipped.
fn mixin_list(entity: &Entity, field: &str) -> ConfigResult<Vec<MixinConfig>> {
    let mut mixins = Vec::new();
    for item in entity.get(field).map(PropertyValue::items).into_iter().flatten() {
        match item {
            PropertyValue::Group(mixin) => mixins.push(MixinConfig::from_entity(mixin)?),
            PropertyValue::Empty => {}
            PropertyValue::Scalar(_) | PropertyValue::Repeated(_) => {
                return Err(ConfigError::MissingField {
                    document: MIXIN_ROOT,
                    field: "wrapperName",
                });
            }
        }
    }
    Ok(mixins)
}

fn mixin_values(mixins: &[MixinConfig]) -> PropertyValue {
    PropertyValue::Repeated(mixins.iter().map(|m| m.to_entity().into()).collect())
}

/// Maps a feed to the adapter serving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub feed_id: String,
    pub adapter_name: String,
}

impl FeedConfig {
    pub fn new(feed_id: impl Into<String>, adapter_name: impl Into<String>) -> Self {
        Self {
            feed_id: feed_id.into(),
            adapter_name: adapter_name.into(),
        }
    }

    /// Parses a `<feed><adapterName>…</adapterName></feed>` document. The
    /// feed id comes from where the document was stored.
    pub fn from_document(feed_id: impl Into<String>, document: &str) -> ConfigResult<Self> {
        let (root, entity) = decode_element(document)?;
        if root != FEED_ROOT {
            return Err(ConfigError::UnexpectedRoot {
                expected: FEED_ROOT,
                found: root,
            });
        }
        Self::from_entity(feed_id, &entity)
    }

    pub fn from_entity(feed_id: impl Into<String>, entity: &Entity) -> ConfigResult<Self> {
        let adapter_name = text_field(entity, ADAPTER_NAME).ok_or(ConfigError::MissingField {
            document: FEED_ROOT,
            field: ADAPTER_NAME,
        })?;
        Ok(Self::new(feed_id, adapter_name))
    }

    pub fn to_document(&self) -> String {
        let entity = Entity::new().with(ADAPTER_NAME, self.adapter_name.as_str());
        encode_with_root(&entity, FEED_ROOT)
    }
}
