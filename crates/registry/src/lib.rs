//! Dynamically reconfigurable index registry.
//!
//! # Purpose
//!
//! Maps indexable-type keys to the index resources (managers, readers)
//! serving them, supports adding new types at runtime from many concurrent
//! threads without losing, blocking, or corrupting in-flight indexing or
//! search, and provides composite readers whose structural identity makes
//! independently-reopened readers usable as downstream cache keys.
//!
//! # Mental model
//!
//! * Readers pin an immutable [`Snapshot`] and resolve lookups against
//!   that view.
//! * Writers build a replacement snapshot copy-on-write and publish it
//!   with a single CAS; losers of a race retry from the latest snapshot.
//! * Handles resolved against an old snapshot stay valid until explicitly
//!   closed; a swap never invalidates them.
//!
//! # Key types
//!
//! | Type | Role |
//! |------|------|
//! | [`IndexRegistry`] | Atomic owner of the current snapshot; boundary object. |
//! | [`Snapshot`] | Immutable point-in-time type → descriptor mapping. |
//! | [`Mutation`] | Copy-on-write delta with validation and CAS commit. |
//! | [`IndexedType`] | Immutable per-type descriptor holding partition handles. |
//! | [`CompositeReader`] | Ordered reader sequence with structural equality/hash. |
//! | [`IndexManager`] / [`IndexManagerFactory`] | Collaborator seams; never implemented here. |
//!
//! # What this crate is not
//!
//! No text analysis, no scoring, no query DSL, no physical index format.
//! Those live behind the [`IndexManager`] boundary.

pub mod composite;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod key;
pub mod manager;
pub mod mutation;
pub mod registry;
mod router;
pub mod snapshot;
pub mod work;

pub use composite::CompositeReader;
pub use config::{BackendConfig, ConfigSource, LayeredConfig};
pub use descriptor::{IndexedType, TypeConfig};
pub use error::RegistryError;
pub use key::TypeKey;
pub use manager::{IndexManager, IndexManagerFactory, IndexReader, ReaderHandle};
pub use mutation::Mutation;
pub use registry::IndexRegistry;
pub use snapshot::Snapshot;
pub use work::{Document, Work, WorkKind};

#[cfg(test)]
pub(crate) mod test_fixtures;


#[cfg(test)]
pub(crate) mod invariants;
