//! Typeless entity model for feedstack.
//!
//! Defines the universal payload type every adapter, wrapper and
//! configuration document flows through:
//! - [`Entity`]: an ordered map from property name to [`PropertyValue`]
//! - [`PropertyValue`]: scalar text, `Empty`, a nested group, or a
//!   repeated group of same-named siblings
//! - [`codec`]: the bidirectional transform between element-per-property
//!   documents and entities
//!
//! Entity payloads, adapter configuration, mixin configuration and ACL
//! documents all decode through the same codec, so a wrapper never needs
//! its own parser.

pub mod codec;
mod entity;
mod error;

pub use codec::{
    decode, decode_element, decode_fragment, encode, encode_fragment, encode_with_root,
    ENTITY_ROOT, REPEATABLE_ATTR,
};
pub use entity::{Entity, PropertyValue};
pub use error::{CodecError, CodecResult};
