//! Collaborator traits: index managers, readers, and their factory.
//!
//! # Role
//!
//! The registry references index resources through these seams but never
//! implements them. A backend crate supplies the concrete kinds; the
//! registry is agnostic to which kind backs a given type.
//!
//! # Ownership
//!
//! Managers are opened by the factory during registration and closed by the
//! registry (rollback or [`crate::registry::IndexRegistry::close`]). Reader
//! handles are owned by the manager that opened them; composites hold them
//! without taking over their lifecycle.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

use crate::config::BackendConfig;
use crate::error::RegistryError;
use crate::key::TypeKey;
use crate::work::Work;

/// Point-in-time read surface over one index partition.
pub trait IndexReader: Send + Sync + 'static {
	/// Number of documents visible to this reader.
	fn num_docs(&self) -> u64;

	/// Entity ids whose `field` equals `term`, in ascending id order.
	fn matching(&self, field: &str, term: &str) -> Vec<u64>;
}

/// Identity-bearing handle to an open [`IndexReader`].
///
/// Equality and hash are defined by the identity of the underlying open
/// resource, not by content: two handles are equal iff they refer to the
/// same reader allocation. Backends that reuse a reader while their state
/// is unchanged therefore yield equal handles across reopens, which is
/// what makes composite readers usable as downstream cache keys.
#[derive(Clone)]
pub struct ReaderHandle(Arc<dyn IndexReader>);

impl ReaderHandle {
	/// Wraps an open reader.
	pub fn new(reader: Arc<dyn IndexReader>) -> Self {
		Self(reader)
	}

	/// Address of the underlying reader allocation.
	///
	/// Compared as a thin pointer: vtable duplication across codegen units
	/// must not produce distinct identities for the same allocation.
	pub(crate) fn identity(&self) -> usize {
		Arc::as_ptr(&self.0) as *const () as usize
	}
}

impl Deref for ReaderHandle {
	type Target = dyn IndexReader;

	fn deref(&self) -> &Self::Target {
		&*self.0
	}
}

impl PartialEq for ReaderHandle {
	fn eq(&self, other: &Self) -> bool {
		self.identity() == other.identity()
	}
}

impl Eq for ReaderHandle {}

impl Hash for ReaderHandle {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_usize(self.identity());
	}
}

impl fmt::Debug for ReaderHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ReaderHandle({:#x})", self.identity())
	}
}

/// Opaque, closeable index resource bound to one partition of one type.
///
/// Managers are shared across all threads once published. The registry
/// treats them as immutable after open; accepting documents is internal
/// mutability the implementation manages itself.
pub trait IndexManager: Send + Sync + 'static {
	/// Partition name, unique within its descriptor.
	fn name(&self) -> &str;

	/// Applies one unit of work to this partition.
	fn apply(&self, work: &Work) -> Result<(), RegistryError>;

	/// Opens a reader over the partition's current state.
	fn open_reader(&self) -> Result<ReaderHandle, RegistryError>;

	/// Releases the partition's resources. Must be idempotent.
	fn close(&self) -> Result<(), RegistryError>;
}

/// Opens the index managers serving one indexable type.
pub trait IndexManagerFactory: Send + Sync {
	/// Opens every partition handle for `key`, in partition order.
	///
	/// All-or-nothing: on failure the factory must release anything it
	/// already opened for this call and report
	/// [`RegistryError::InvalidConfiguration`].
	fn open(
		&self,
		key: &TypeKey,
		config: &BackendConfig,
	) -> Result<Vec<Arc<dyn IndexManager>>, RegistryError>;
}
