//! Work routing over resolved descriptors.
//!
//! Routing runs against a descriptor already resolved from a single
//! snapshot read: a concurrent registration cannot change the target
//! mid-dispatch, and registration never holds a lock these functions could
//! block on.

use std::sync::Arc;

use crate::descriptor::IndexedType;
use crate::error::RegistryError;
use crate::manager::IndexManager;
use crate::work::Work;

/// Picks the partition serving `entity_id`.
///
/// Stable for a given partition count, so add/delete pairs for the same
/// entity land on the same partition.
pub(crate) fn shard_for(
	managers: &[Arc<dyn IndexManager>],
	entity_id: u64,
) -> &Arc<dyn IndexManager> {
	let idx = (entity_id % managers.len() as u64) as usize;
	&managers[idx]
}

/// Routes one work item to the descriptor's partition handles.
///
/// Targeted kinds go to exactly one partition; broadcast kinds reach every
/// partition in order.
pub(crate) fn route(ty: &IndexedType, work: &Work) -> Result<(), RegistryError> {
	let managers = ty.managers();
	if work.kind.is_targeted() {
		let manager = shard_for(managers, work.entity_id);
		tracing::trace!(
			key = %ty.key(),
			partition = manager.name(),
			kind = ?work.kind,
			entity = work.entity_id,
			"routing work"
		);
		manager.apply(work)
	} else {
		tracing::trace!(key = %ty.key(), kind = ?work.kind, "broadcasting work");
		for manager in managers {
			manager.apply(work)?;
		}
		Ok(())
	}
}
