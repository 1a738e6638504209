//! Mixin (decorator) declarations.

use feedstack_model::{decode_element, encode, encode_with_root, Entity, PropertyValue};

use crate::error::{ConfigError, ConfigResult};

/// Root element of a standalone mixin document.
pub const MIXIN_ROOT: &str = "mixin";

const ADAPTER_NAME: &str = "adapterName";
const WRAPPER_NAME: &str = "wrapperName";
const WRAPPER_CONFIG: &str = "wrapperConfig";

/// One decorator declaration.
///
/// Declared inline (an entry of an adapter's `mixins` list) it names a
/// wrapper implementation via `wrapper_class_id`. Declared as the config
/// payload of an indirection record it names the adapter being redirected
/// to via `target_adapter_name`, and optionally the wrapper applied on top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MixinConfig {
    pub target_adapter_name: Option<String>,
    pub wrapper_class_id: Option<String>,
    /// The wrapper's own configuration document, passed to it verbatim.
    /// A value of the form `@path` refers to a config store resource.
    pub wrapper_config: Option<String>,
}

impl MixinConfig {
    /// An inline mixin applying `wrapper_class_id` with `config`.
    pub fn wrapper(wrapper_class_id: impl Into<String>, config: Option<String>) -> Self {
        Self {
            target_adapter_name: None,
            wrapper_class_id: Some(wrapper_class_id.into()),
            wrapper_config: config,
        }
    }

    /// A mixin that redirects to `adapter_name`.
    pub fn redirect(adapter_name: impl Into<String>) -> Self {
        Self {
            target_adapter_name: Some(adapter_name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_wrapper(mut self, wrapper_class_id: impl Into<String>, config: Option<String>) -> Self {
        self.wrapper_class_id = Some(wrapper_class_id.into());
        self.wrapper_config = config;
        self
    }

    /// Parses a mixin document. The root is either `<mixin>` or any
    /// element holding exactly one `<mixin>` child.
    pub fn from_document(document: &str) -> ConfigResult<Self> {
        let (root, entity) = decode_element(document)?;
        if root == MIXIN_ROOT {
            return Self::from_entity(&entity);
        }
        match entity.get_group(MIXIN_ROOT) {
            Some(inner) if entity.len() == 1 => Self::from_entity(inner),
            _ => Err(ConfigError::UnexpectedRoot {
                expected: MIXIN_ROOT,
                found: root,
            }),
        }
    }

    pub fn from_entity(entity: &Entity) -> ConfigResult<Self> {
        Ok(Self {
            target_adapter_name: text_field(entity, ADAPTER_NAME),
            wrapper_class_id: text_field(entity, WRAPPER_NAME),
            wrapper_config: payload_text(entity, MIXIN_ROOT, WRAPPER_CONFIG)?,
        })
    }

    pub fn to_entity(&self) -> Entity {
        let mut entity = Entity::new();
        if let Some(name) = &self.target_adapter_name {
            entity.insert(ADAPTER_NAME, name.as_str());
        }
        if let Some(id) = &self.wrapper_class_id {
            entity.insert(WRAPPER_NAME, id.as_str());
        }
        if let Some(config) = &self.wrapper_config {
            entity.insert(WRAPPER_CONFIG, config.as_str());
        }
        entity
    }

    pub fn to_document(&self) -> String {
        encode_with_root(&self.to_entity(), MIXIN_ROOT)
    }

    /// True when this mixin redirects to another adapter.
    pub fn is_redirect(&self) -> bool {
        self.target_adapter_name.is_some()
    }
}

/// Trimmed text of a scalar field, ignoring empty values.
pub(crate) fn text_field(entity: &Entity, name: &str) -> Option<String> {
    entity
        .get_str(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// An opaque payload carried inside a config document: plain text is
/// taken as-is, nested markup is re-encoded into a standalone document.
/// A single nested element becomes the root of that document; anything
/// else is wrapped in `<entity>`. More than one value is an error.
pub(crate) fn payload_text(
    entity: &Entity,
    document: &'static str,
    field: &'static str,
) -> ConfigResult<Option<String>> {
    let Some(value) = entity.get(field) else {
        return Ok(None);
    };
    let mut items = value.items();
    let (Some(first), None) = (items.next(), items.next()) else {
        return Err(ConfigError::RepeatedField { document, field });
    };
    Ok(match first {
        PropertyValue::Scalar(text) => Some(text.clone()),
        PropertyValue::Group(inner) => match inner.iter().next() {
            Some((name, PropertyValue::Group(only))) if inner.len() == 1 => {
                Some(encode_with_root(only, name))
            }
            _ => Some(encode(inner)),
        },
        PropertyValue::Empty | PropertyValue::Repeated(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_payload_is_reencoded() {
        let doc = "<mixin><wrapperName>acl</wrapperName>\
                   <wrapperConfig><acl repeatable=\"true\"><x>1</x></acl></wrapperConfig></mixin>";
        let mixin = MixinConfig::from_document(doc).unwrap();
        assert_eq!(
            mixin.wrapper_config.as_deref(),
            Some("<entity><acl repeatable=\"true\"><x>1</x></acl></entity>")
        );
    }

    #[test]
    fn single_nested_element_becomes_root() {
        let doc = "<mixin><wrapperConfig><rules><x>1</x></rules></wrapperConfig></mixin>";
        let mixin = MixinConfig::from_document(doc).unwrap();
        assert_eq!(mixin.wrapper_config.as_deref(), Some("<rules><x>1</x></rules>"));
    }

    #[test]
    fn blank_fields_are_absent() {
        let mixin = MixinConfig::from_document("<mixin><adapterName> </adapterName></mixin>").unwrap();
        assert_eq!(mixin, MixinConfig::default());
    }

    #[test]
    fn repeated_payload_is_rejected() {
        let doc = "<mixin><wrapperName>acl</wrapperName>\
                   <wrapperConfig>a</wrapperConfig><wrapperConfig>b</wrapperConfig></mixin>";
        let err = MixinConfig::from_document(doc).unwrap_err();
        assert!(
            matches!(err, ConfigError::RepeatedField { field: "wrapperConfig", .. }),
            "{err:?}"
        );
    }
}
