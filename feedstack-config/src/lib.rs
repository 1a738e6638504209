//! Declarative configuration for feedstack.
//!
//! - [`AdapterConfig`] / [`MixinConfig`] / [`FeedConfig`]: immutable records
//!   parsed from element-per-property documents
//! - [`ConfigStore`]: async lookup of those records per namespace, with
//!   [`MemoryConfigStore`] and [`FileSystemConfigStore`] implementations
//! - [`ServerConfig`]: process-wide settings from `feedstack.toml`

mod adapter;
mod error;
mod fs;
mod memory;
mod mixin;
mod settings;
mod store;

pub use adapter::{AdapterConfig, FeedConfig, ADAPTER_ROOT, FEED_ROOT};
pub use error::{ConfigError, ConfigResult};
pub use fs::FileSystemConfigStore;
pub use memory::MemoryConfigStore;
pub use mixin::{MixinConfig, MIXIN_ROOT};
pub use settings::{ImplicitWrapperPolicy, ServerConfig};
pub use store::{ConfigStore, RESOURCE_PREFIX};
