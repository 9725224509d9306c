//! Immutable per-type descriptors and their registration inputs.

use std::fmt;
use std::sync::Arc;

use crate::config::{BackendConfig, ConfigSource};
use crate::key::TypeKey;
use crate::manager::IndexManager;

/// Registration input: a type key plus the opaque settings its backend
/// handles are opened with.
#[derive(Clone, Debug)]
pub struct TypeConfig {
	/// Key of the type being registered.
	pub key: TypeKey,
	/// Settings forwarded to the factory, uninterpreted.
	pub config: BackendConfig,
}

impl TypeConfig {
	/// Creates an input with explicit settings.
	pub fn new(key: impl Into<TypeKey>, config: BackendConfig) -> Self {
		Self {
			key: key.into(),
			config,
		}
	}

	/// Creates an input with empty settings.
	pub fn bare(key: impl Into<TypeKey>) -> Self {
		Self::new(key, BackendConfig::default())
	}

	/// Creates an input by resolving settings from a [`ConfigSource`].
	pub fn from_source(key: impl Into<TypeKey>, source: &dyn ConfigSource) -> Self {
		let key = key.into();
		let config = source.settings_for(&key);
		Self { key, config }
	}
}

/// Immutable description of one indexable type.
///
/// Created at registration, never mutated, replaced wholesale if the
/// type's handle set ever changes. A snapshot swap that leaves a type
/// untouched reuses its descriptor by reference, so the handles are never
/// reopened by a swap.
pub struct IndexedType {
	key: TypeKey,
	managers: Box<[Arc<dyn IndexManager>]>,
}

impl IndexedType {
	pub(crate) fn new(key: TypeKey, managers: Vec<Arc<dyn IndexManager>>) -> Self {
		Self {
			key,
			managers: managers.into_boxed_slice(),
		}
	}

	/// Key of the described type.
	pub fn key(&self) -> &TypeKey {
		&self.key
	}

	/// Partition handles, in partition order.
	pub fn managers(&self) -> &[Arc<dyn IndexManager>] {
		&self.managers
	}

	/// Number of partitions serving the type.
	pub fn partitions(&self) -> usize {
		self.managers.len()
	}
}

impl fmt::Debug for IndexedType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IndexedType")
			.field("key", &self.key)
			.field("partitions", &self.partitions())
			.finish()
	}
}
