//! Invariant proof tests for registry concurrency.
//!
//! These exercise the contracts the rest of the crate is built on: no
//! lost registrations under contention, reader independence from
//! unrelated swaps, snapshot liveness while pinned, and loser-side
//! handle rollback.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::descriptor::TypeConfig;
use crate::error::RegistryError;
use crate::key::TypeKey;
use crate::manager::IndexManager;
use crate::registry::IndexRegistry;
use crate::test_fixtures::StubFactory;
use crate::work::{Document, Work};

/// N threads each register M disjoint types concurrently against the same
/// initially-empty registry; every registration survives, and every type
/// accepts work afterwards.
#[cfg_attr(test, test)]
pub(crate) fn test_no_lost_registrations() {
	const THREADS: usize = 10;
	const TYPES_PER_THREAD: usize = 10;

	let factory = StubFactory::new();
	let registry = Arc::new(IndexRegistry::open(factory.clone(), Vec::new()).unwrap());

	let mut joins = Vec::new();
	for t in 0..THREADS {
		let registry = Arc::clone(&registry);
		joins.push(thread::spawn(move || {
			for i in 0..TYPES_PER_THREAD {
				let key: TypeKey = format!("type-{t}-{i}").into();
				registry
					.register_types(vec![TypeConfig::new(key.clone(), Default::default())])
					.unwrap();
				// The commit we awaited makes the type dispatchable.
				registry
					.dispatch(&key, Work::add(i as u64, Document::new()))
					.unwrap();
			}
		}));
	}
	for join in joins {
		join.join().unwrap();
	}

	let snap = registry.snapshot();
	assert_eq!(snap.len(), THREADS * TYPES_PER_THREAD);

	// Losing attempts reopened and closed handles; the surviving handle
	// set is exactly one live partition per type, each with one work item.
	let live: Vec<_> = factory
		.opened_handles()
		.into_iter()
		.filter(|m| !m.is_closed())
		.collect();
	assert_eq!(live.len(), THREADS * TYPES_PER_THREAD);
	for manager in &live {
		assert_eq!(manager.applied_count(), 1);
	}
}

/// Dispatch for an established type succeeds identically whether or not
/// concurrent registrations of unrelated types commit during the calls.
#[cfg_attr(test, test)]
pub(crate) fn test_dispatch_unaffected_by_concurrent_registration() {
	const DISPATCHES: usize = 500;
	const REGISTRATIONS: usize = 50;

	let factory = StubFactory::new();
	let registry = Arc::new(IndexRegistry::open(factory.clone(), Vec::new()).unwrap());
	let anchor: TypeKey = "anchor".into();
	registry
		.register_types(vec![TypeConfig::bare("anchor")])
		.unwrap();

	let done = Arc::new(AtomicBool::new(false));
	let registrar = {
		let registry = Arc::clone(&registry);
		let done = Arc::clone(&done);
		thread::spawn(move || {
			for i in 0..REGISTRATIONS {
				registry
					.register_types(vec![TypeConfig::bare(format!("other-{i}"))])
					.unwrap();
			}
			done.store(true, Ordering::Release);
		})
	};

	for id in 0..DISPATCHES {
		registry
			.dispatch(&anchor, Work::add(id as u64, Document::new()))
			.unwrap();
	}
	registrar.join().unwrap();
	assert!(done.load(Ordering::Acquire));

	assert_eq!(registry.snapshot().len(), REGISTRATIONS + 1);
	let anchor_manager = &factory.opened_handles()[0];
	assert_eq!(anchor_manager.applied_count(), DISPATCHES);
}

/// Pinned snapshots and descriptors stay valid and unchanged across later
/// publications.
#[cfg_attr(test, test)]
pub(crate) fn test_snapshot_liveness_across_swap() {
	let registry = IndexRegistry::open(StubFactory::new(), Vec::new()).unwrap();
	registry.register_types(vec![TypeConfig::bare("a")]).unwrap();

	let key: TypeKey = "a".into();
	let pinned = registry.snapshot();
	let descriptor = Arc::clone(pinned.get(&key).unwrap());

	registry.register_types(vec![TypeConfig::bare("b")]).unwrap();

	let current = registry.snapshot();
	assert!(!Arc::ptr_eq(&pinned, &current));
	// The pinned view still reads as it did when taken.
	assert_eq!(pinned.len(), 1);
	assert!(pinned.contains(&key));
	// The unchanged descriptor was carried into the new snapshot.
	assert!(Arc::ptr_eq(&descriptor, current.get(&key).unwrap()));
}

/// Exactly one of two mutations racing from the same base commits; the
/// loser reports the conflict and closes its optimistically-opened
/// handles.
#[cfg_attr(test, test)]
pub(crate) fn test_losing_commit_rolls_back_handles() {
	let factory = StubFactory::new();
	let registry = IndexRegistry::open(factory.clone(), Vec::new()).unwrap();

	let mut winner = registry.begin_mutation().unwrap();
	let mut loser = registry.begin_mutation().unwrap();

	winner.add_type(TypeConfig::bare("alpha")).unwrap();
	loser.add_type(TypeConfig::bare("beta")).unwrap();

	winner.commit().unwrap();
	let err = loser.commit().unwrap_err();
	assert!(matches!(err, RegistryError::ConcurrentMutation));
	assert!(err.is_retryable());

	let snap = registry.snapshot();
	assert_eq!(snap.len(), 1);
	assert!(snap.contains(&"alpha".into()));

	let handles = factory.opened_handles();
	assert_eq!(handles.len(), 2);
	let beta = handles
		.iter()
		.find(|m| m.name().starts_with("beta"))
		.unwrap();
	assert!(beta.is_closed());
	let alpha = handles
		.iter()
		.find(|m| m.name().starts_with("alpha"))
		.unwrap();
	assert!(!alpha.is_closed());

	// The documented recovery: re-read and re-apply against the new base.
	registry.register_types(vec![TypeConfig::bare("beta")]).unwrap();
	assert_eq!(registry.snapshot().len(), 2);
}

/// An abandoned mutation closes everything it opened.
#[cfg_attr(test, test)]
pub(crate) fn test_abandoned_mutation_rolls_back_handles() {
	let factory = StubFactory::new();
	let registry = IndexRegistry::open(factory.clone(), Vec::new()).unwrap();

	{
		let mut mutation = registry.begin_mutation().unwrap();
		mutation.add_type(TypeConfig::bare("orphan")).unwrap();
		assert_eq!(mutation.staged(), 1);
		// Dropped without commit.
	}

	assert!(registry.snapshot().is_empty());
	let handles = factory.opened_handles();
	assert_eq!(handles.len(), 1);
	assert!(handles[0].is_closed());
}
