//! Adapter contract and decorator-chain resolution for feedstack.
//!
//! Every storage backend and every cross-cutting behavior implements
//! [`FeedAdapter`]. A [`ChainResolver`] turns an adapter name into a
//! decorated chain:
//!
//! ```text
//! W3 -> W2 -> W1 -> base          (wrappers listed as [W1, W2, W3])
//! ACL -> [contacts] -> W1 -> base (indirection record "guarded" -> "contacts")
//! ```
//!
//! Implementations are looked up by id in an [`AdapterRegistry`] instead
//! of being loaded by name at runtime.

mod adapter;
mod error;
mod memory;
mod passthrough;
mod registry;
mod resolver;

pub use adapter::{adapter_chain, mock, AdapterDescriptor, AdapterKind, FeedAdapter};
pub use error::{FeedError, FeedResult};
pub use memory::{MemoryAdapter, ID_PROPERTY};
pub use passthrough::{ChainBoundary, PassThroughWrapper};
pub use registry::{
    AdapterContext, AdapterFactory, AdapterRegistry, WrapperFactory, MEMORY_ADAPTER,
    PASSTHROUGH_WRAPPER,
};
pub use resolver::{ChainResolver, ResolvedAdapter};
