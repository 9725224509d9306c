//! Copy-on-write registry mutations.
//!
//! # Mental model
//!
//! * A mutation captures the current snapshot as its base.
//! * `add_type` validates immediately and opens backend handles
//!   optimistically.
//! * `commit` builds the replacement snapshot and publishes it with a
//!   single CAS keyed on the base's identity.
//! * A failed CAS means another mutation won first: the loser's staged
//!   handles are closed and the caller retries against the new current
//!   snapshot.
//!
//! Readers never observe a partially-built snapshot; exactly one of two
//! racing commits against the same base wins.

use std::sync::Arc;

use crate::descriptor::{IndexedType, TypeConfig};
use crate::error::RegistryError;
use crate::registry::IndexRegistry;
use crate::snapshot::Snapshot;

/// In-flight copy-on-write mutation over a base snapshot.
///
/// Handles opened while staging are closed again if the mutation is
/// abandoned, fails validation, or loses the publication race, so nothing
/// leaks on any non-commit path.
#[derive(Debug)]
pub struct Mutation<'r> {
	registry: &'r IndexRegistry,
	base: Arc<Snapshot>,
	added: Vec<Arc<IndexedType>>,
	committed: bool,
}

impl<'r> Mutation<'r> {
	pub(crate) fn new(registry: &'r IndexRegistry, base: Arc<Snapshot>) -> Self {
		Self {
			registry,
			base,
			added: Vec::new(),
			committed: false,
		}
	}

	/// Returns the snapshot this mutation was begun against.
	pub fn base(&self) -> &Arc<Snapshot> {
		&self.base
	}

	/// Number of types staged so far.
	pub fn staged(&self) -> usize {
		self.added.len()
	}

	/// Stages a type, opening its backend handles immediately.
	///
	/// Fails with [`RegistryError::DuplicateType`] if the type is present
	/// in the base snapshot or was already staged in this mutation, and
	/// with [`RegistryError::InvalidConfiguration`] if the factory cannot
	/// open the type's handles.
	pub fn add_type(&mut self, spec: TypeConfig) -> Result<&mut Self, RegistryError> {
		let TypeConfig { key, config } = spec;
		if self.base.contains(&key) || self.added.iter().any(|ty| ty.key() == &key) {
			return Err(RegistryError::DuplicateType(key));
		}
		let managers = self.registry.factory().open(&key, &config)?;
		if managers.is_empty() {
			return Err(RegistryError::InvalidConfiguration {
				key,
				reason: "factory returned no index managers".into(),
			});
		}
		self.added.push(Arc::new(IndexedType::new(key, managers)));
		Ok(self)
	}

	/// Publishes the staged delta atomically.
	///
	/// Succeeds only if the registry's current snapshot is still this
	/// mutation's base; otherwise the staged handles are closed and
	/// [`RegistryError::ConcurrentMutation`] is returned, and the caller
	/// retries by beginning a fresh mutation against the new current
	/// snapshot. Concurrent deltas are never merged into a torn state.
	pub fn commit(mut self) -> Result<Arc<Snapshot>, RegistryError> {
		if self.added.is_empty() {
			self.committed = true;
			return Ok(Arc::clone(&self.base));
		}
		let next = Arc::new(self.base.with_added(&self.added));
		let prev = self
			.registry
			.swap_slot()
			.compare_and_swap(&self.base, Arc::clone(&next));
		if Arc::ptr_eq(&prev, &self.base) {
			self.committed = true;
			tracing::debug!(
				added = self.added.len(),
				types = next.len(),
				"published registry snapshot"
			);
			Ok(next)
		} else {
			// Drop closes the staged handles.
			Err(RegistryError::ConcurrentMutation)
		}
	}

	fn rollback(&mut self) {
		for ty in self.added.drain(..) {
			for manager in ty.managers() {
				if let Err(error) = manager.close() {
					tracing::warn!(
						partition = manager.name(),
						%error,
						"failed to close handle while rolling back mutation"
					);
				}
			}
		}
	}
}

impl Drop for Mutation<'_> {
	fn drop(&mut self) {
		if !self.committed {
			self.rollback();
		}
	}
}
