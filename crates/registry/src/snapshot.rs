//! Immutable registry snapshots.
//!
//! # Role
//!
//! A snapshot is the pure view type every read path resolves against. It
//! contains no mutation logic; replacements are built copy-on-write by
//! [`crate::mutation::Mutation`] and published atomically.
//!
//! # Invariants
//!
//! - Every key maps to exactly one descriptor.
//! - Entries never change after publication; later snapshots share
//!   unchanged descriptors by reference (see
//!   `invariants::test_snapshot_liveness_across_swap`).

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::descriptor::IndexedType;
use crate::key::TypeKey;

/// Immutable point-in-time view of the type registry.
pub struct Snapshot {
	entries: FxHashMap<TypeKey, Arc<IndexedType>>,
}

impl Snapshot {
	/// The empty snapshot every registry starts from.
	pub(crate) fn empty() -> Self {
		Self {
			entries: FxHashMap::default(),
		}
	}

	/// Looks up the descriptor for `key`.
	pub fn get(&self, key: &TypeKey) -> Option<&Arc<IndexedType>> {
		self.entries.get(key)
	}

	/// True if `key` is registered in this snapshot.
	pub fn contains(&self, key: &TypeKey) -> bool {
		self.entries.contains_key(key)
	}

	/// Number of registered types.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when no types are registered.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates descriptors in unspecified order.
	pub fn iter(&self) -> impl Iterator<Item = &Arc<IndexedType>> {
		self.entries.values()
	}

	/// Iterates registered keys in unspecified order.
	pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
		self.entries.keys()
	}

	/// Builds a replacement containing all entries of `self` plus `added`.
	///
	/// Unchanged descriptors are shared by reference, never rebuilt.
	pub(crate) fn with_added(&self, added: &[Arc<IndexedType>]) -> Self {
		let mut entries = self.entries.clone();
		entries.reserve(added.len());
		for ty in added {
			entries.insert(ty.key().clone(), Arc::clone(ty));
		}
		Self { entries }
	}
}

impl fmt::Debug for Snapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Snapshot")
			.field("types", &self.len())
			.finish()
	}
}
