//! Registry error taxonomy.

use crate::key::TypeKey;

/// Errors surfaced by registry operations.
///
/// All variants are synchronous return values on the calling thread. A
/// failed registration leaves the registry in its prior state; no partial
/// snapshot ever becomes current.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
	/// Registration of a type already present in the mutation's base
	/// snapshot (or earlier in the same batch). Not retryable as-is; the
	/// caller must pick a different delta.
	#[error("type already registered: {0}")]
	DuplicateType(TypeKey),

	/// A descriptor's handles could not be opened.
	#[error("invalid configuration for {key}: {reason}")]
	InvalidConfiguration {
		/// Type whose registration failed.
		key: TypeKey,
		/// Backend-supplied failure description.
		reason: String,
	},

	/// Optimistic-concurrency conflict on commit: the current snapshot is
	/// no longer the one the mutation was begun against. Retryable by
	/// re-reading the current snapshot and re-applying the delta.
	#[error("concurrent mutation committed since this mutation began")]
	ConcurrentMutation,

	/// Dispatch or reader-open against a type absent from the snapshot
	/// observed at call time. The caller is responsible for registering a
	/// type and awaiting a successful commit before submitting work.
	#[error("unknown indexed type: {0}")]
	UnknownType(TypeKey),

	/// The registry has been closed; no further mutations are accepted.
	#[error("registry is closed")]
	Closed,

	/// Fault from an external handle, propagated unchanged. The registry
	/// has no remediation for handle I/O failures.
	#[error(transparent)]
	Backend(#[from] anyhow::Error),
}

impl RegistryError {
	/// True for conflicts the caller may resolve by re-reading the current
	/// snapshot and re-applying the delta.
	pub fn is_retryable(&self) -> bool {
		matches!(self, RegistryError::ConcurrentMutation)
	}
}
