//! In-memory index backend for the quarry registry.
//!
//! # Purpose
//!
//! A complete, heap-backed implementation of the registry's backend seams:
//! [`MemIndexManager`] stores documents per partition, [`MemFactory`] opens
//! partition sets from backend settings. Useful as the reference backend
//! and as the integration harness for registry semantics.
//!
//! # Mental model
//!
//! Each partition keeps its documents in an ordered map guarded by a
//! generation counter. Opening a reader snapshots the map; while the
//! generation is unchanged the same reader handle is reused, so composite
//! readers built over an unchanged index compare equal and hit downstream
//! caches.

pub mod factory;
pub mod manager;

pub use factory::{MemFactory, SETTING_BACKEND, SETTING_SHARDS};
pub use manager::{MemIndexManager, MemReader};
