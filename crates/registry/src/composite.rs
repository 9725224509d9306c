//! Composite readers with structural identity.
//!
//! # Purpose
//!
//! Queries spanning the partitions of one or more types read through a
//! single logical reader built from the per-partition handles. Downstream
//! result caches key cached entries by `(query, reader)`; because every
//! query execution composes a *new* composite object over the same
//! sub-readers, reference equality would give those caches a 0% hit rate.
//! Composites therefore compare structurally: same sub-handles, same
//! order. Any real change to the underlying state replaces a sub-handle
//! and correctly invalidates the key.
//!
//! # Ownership
//!
//! The composite owns only the handle sequence. Sub-readers stay owned by
//! the index managers that opened them; closing a composite releases the
//! array and nothing else.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::manager::ReaderHandle;

/// Accumulator seed for the identity hash.
///
/// Non-zero so the empty composite cannot collide with zero-initialized
/// accumulator states.
const HASH_SEED: u64 = 0x51_7c_c1_b7_27_22_0a_95;

/// Logical reader spanning an ordered sequence of per-partition readers.
///
/// Equality and hash are structural over the sub-handle sequence,
/// including order: `[x, y]` and `[y, x]` are distinct composites, because
/// composite addressing depends on sub order. Sequences of different
/// lengths are always unequal.
pub struct CompositeReader {
	subs: Box<[ReaderHandle]>,
}

impl CompositeReader {
	/// Composes sub-handles in the given order.
	///
	/// Pure construction, no I/O. An empty sequence is a valid composite,
	/// equal only to other empty composites.
	pub fn compose(subs: Vec<ReaderHandle>) -> Self {
		Self {
			subs: subs.into_boxed_slice(),
		}
	}

	/// Sub-handles in composition order.
	pub fn sub_readers(&self) -> &[ReaderHandle] {
		&self.subs
	}

	/// Number of sub-readers.
	pub fn len(&self) -> usize {
		self.subs.len()
	}

	/// True when the composite spans no readers.
	pub fn is_empty(&self) -> bool {
		self.subs.is_empty()
	}

	/// Total document count across sub-readers.
	pub fn num_docs(&self) -> u64 {
		self.subs.iter().map(|sub| sub.num_docs()).sum()
	}

	/// Entity ids matching `field == term`, concatenated in sub order.
	pub fn matching(&self, field: &str, term: &str) -> Vec<u64> {
		let mut hits = Vec::new();
		for sub in &self.subs {
			hits.extend(sub.matching(field, term));
		}
		hits
	}

	/// Order-sensitive structural identity hash.
	///
	/// Polynomial accumulation over the sub-handle identities, so equal
	/// composites always hash identically and reordered or differing
	/// membership diverges with overwhelming probability.
	pub fn identity_hash(&self) -> u64 {
		let mut h = HASH_SEED;
		for sub in &self.subs {
			h = h.wrapping_mul(31).wrapping_add(sub.identity() as u64);
		}
		h
	}

	/// Releases the sub-handle sequence.
	///
	/// Sub-readers are closed by the managers that own them, never by the
	/// composite.
	pub fn close(self) {}
}

impl PartialEq for CompositeReader {
	fn eq(&self, other: &Self) -> bool {
		self.subs == other.subs
	}
}

impl Eq for CompositeReader {}

impl Hash for CompositeReader {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u64(self.identity_hash());
	}
}

impl fmt::Debug for CompositeReader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CompositeReader")
			.field("subs", &self.subs)
			.finish()
	}
}
