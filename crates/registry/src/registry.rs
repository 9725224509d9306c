//! Registry container with atomic snapshot publication.
//!
//! # Mental model
//!
//! * Readers load an `Arc<Snapshot>` and resolve against that immutable
//!   view; a swap never invalidates handles already resolved.
//! * Writers build a replacement snapshot and publish it with CAS.
//! * A failed CAS means "someone else won first"; the writer retries from
//!   the latest snapshot.
//!
//! # Concurrency & ordering
//!
//! * Reads (`dispatch`, reader opens) are one atomic pointer load plus a
//!   map lookup; they never block on registrations, related or not.
//! * Commits are linearizable with respect to the current-snapshot
//!   pointer: one total order of successful commits, observed identically
//!   by all readers.
//! * A dispatch racing a registration of the same type may see either the
//!   old snapshot (`UnknownType`) or the new one. Callers register and
//!   await the commit before submitting work for a type.
//!
//! # Failure modes & recovery
//!
//! * Lost publication races surface as `ConcurrentMutation`;
//!   [`IndexRegistry::register_types`] retries them internally.
//! * Failed registrations leave the prior snapshot current and close any
//!   optimistically-opened handles.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use rustc_hash::FxHashSet;

use crate::composite::CompositeReader;
use crate::descriptor::TypeConfig;
use crate::error::RegistryError;
use crate::key::TypeKey;
use crate::manager::{IndexManagerFactory, ReaderHandle};
use crate::mutation::Mutation;
use crate::router;
use crate::snapshot::Snapshot;
use crate::work::Work;

/// Process-wide registry of indexable types.
///
/// Maps type keys to the index-manager handles serving them and supports
/// registering new types at runtime from many threads without blocking or
/// corrupting in-flight indexing and search.
pub struct IndexRegistry {
	snap: ArcSwap<Snapshot>,
	factory: Arc<dyn IndexManagerFactory>,
	closed: AtomicBool,
}

impl IndexRegistry {
	/// Opens a registry with zero or more initial types.
	pub fn open(
		factory: Arc<dyn IndexManagerFactory>,
		initial: Vec<TypeConfig>,
	) -> Result<Self, RegistryError> {
		let registry = Self {
			snap: ArcSwap::from_pointee(Snapshot::empty()),
			factory,
			closed: AtomicBool::new(false),
		};
		if !initial.is_empty() {
			let mut mutation = registry.begin_mutation()?;
			for spec in initial {
				mutation.add_type(spec)?;
			}
			mutation.commit()?;
		}
		Ok(registry)
	}

	/// Returns the currently published snapshot.
	pub fn snapshot(&self) -> Arc<Snapshot> {
		self.snap.load_full()
	}

	pub(crate) fn swap_slot(&self) -> &ArcSwap<Snapshot> {
		&self.snap
	}

	pub(crate) fn factory(&self) -> &dyn IndexManagerFactory {
		&*self.factory
	}

	/// Begins a copy-on-write mutation against the current snapshot.
	///
	/// The low-level mutator surface: `commit` reports
	/// [`RegistryError::ConcurrentMutation`] to callers managing their own
	/// retry policy. Most hosts want [`IndexRegistry::register_types`].
	pub fn begin_mutation(&self) -> Result<Mutation<'_>, RegistryError> {
		if self.closed.load(Ordering::Acquire) {
			return Err(RegistryError::Closed);
		}
		Ok(Mutation::new(self, self.snap.load_full()))
	}

	/// Registers a batch of types, retrying on publication conflicts.
	///
	/// Conflicts are transient (another thread published first); the batch
	/// is re-validated and re-applied against the new current snapshot
	/// until it commits or fails for a non-retryable reason. Either the
	/// whole batch becomes current or none of it does.
	pub fn register_types(&self, specs: Vec<TypeConfig>) -> Result<(), RegistryError> {
		loop {
			let mut mutation = self.begin_mutation()?;
			for spec in &specs {
				mutation.add_type(spec.clone())?;
			}
			match mutation.commit() {
				Ok(_) => return Ok(()),
				Err(RegistryError::ConcurrentMutation) => {
					tracing::debug!("registration lost publication race; retrying");
				}
				Err(other) => return Err(other),
			}
		}
	}

	/// Routes one work item to the partitions serving its type.
	///
	/// The snapshot is read once per call, so a concurrent swap cannot
	/// change the resolved target mid-dispatch. Fails with
	/// [`RegistryError::UnknownType`] if the type is absent from the
	/// snapshot observed at call time.
	pub fn dispatch(&self, key: &TypeKey, work: Work) -> Result<(), RegistryError> {
		let snap = self.snap.load();
		let ty = snap
			.get(key)
			.ok_or_else(|| RegistryError::UnknownType(key.clone()))?;
		router::route(ty, &work)
	}

	/// Opens a composite reader over every partition of one type.
	pub fn open_reader(&self, key: &TypeKey) -> Result<CompositeReader, RegistryError> {
		self.open_composite_reader(std::slice::from_ref(key))
	}

	/// Opens a composite reader spanning the given types, in order.
	///
	/// All keys resolve against a single snapshot read; partition readers
	/// are collected in type order, then partition order. Fails with
	/// [`RegistryError::UnknownType`] on the first unregistered key.
	pub fn open_composite_reader(
		&self,
		keys: &[TypeKey],
	) -> Result<CompositeReader, RegistryError> {
		let snap = self.snap.load();
		let mut subs: Vec<ReaderHandle> = Vec::new();
		for key in keys {
			let ty = snap
				.get(key)
				.ok_or_else(|| RegistryError::UnknownType(key.clone()))?;
			subs.reserve(ty.partitions());
			for manager in ty.managers() {
				subs.push(manager.open_reader()?);
			}
		}
		Ok(CompositeReader::compose(subs))
	}

	/// Closes the registry and every handle reachable from the final
	/// snapshot.
	///
	/// Idempotent: later calls are no-ops. Subsequent dispatches and
	/// reader opens observe the empty snapshot; subsequent mutations fail
	/// with [`RegistryError::Closed`]. The first close fault is returned
	/// after all handles have been attempted.
	pub fn close(&self) -> Result<(), RegistryError> {
		if self.closed.swap(true, Ordering::AcqRel) {
			return Ok(());
		}
		let last = self.snap.swap(Arc::new(Snapshot::empty()));
		let mut first_error = None;
		let mut seen = FxHashSet::default();
		for ty in last.iter() {
			for manager in ty.managers() {
				if !seen.insert(Arc::as_ptr(manager) as *const () as usize) {
					continue;
				}
				if let Err(error) = manager.close() {
					tracing::warn!(
						partition = manager.name(),
						%error,
						"failed to close index manager"
					);
					if first_error.is_none() {
						first_error = Some(error);
					}
				}
			}
		}
		tracing::debug!(types = last.len(), "closed index registry");
		match first_error {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}
}

impl fmt::Debug for IndexRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("IndexRegistry")
			.field("types", &self.snap.load().len())
			.field("closed", &self.closed.load(Ordering::Relaxed))
			.finish()
	}
}
