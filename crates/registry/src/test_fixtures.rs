//! Shared stub collaborators for registry tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::config::BackendConfig;
use crate::error::RegistryError;
use crate::key::TypeKey;
use crate::manager::{IndexManager, IndexManagerFactory, IndexReader, ReaderHandle};
use crate::work::Work;

/// Reader stub with a fixed document count and no term matching.
pub(crate) struct StubReader {
	pub(crate) docs: u64,
}

impl IndexReader for StubReader {
	fn num_docs(&self) -> u64 {
		self.docs
	}

	fn matching(&self, _field: &str, _term: &str) -> Vec<u64> {
		Vec::new()
	}
}

/// Creates a fresh reader handle with its own identity.
pub(crate) fn reader(docs: u64) -> ReaderHandle {
	ReaderHandle::new(Arc::new(StubReader { docs }))
}

/// Manager stub that counts applied work and records close calls.
///
/// Each stub keeps one stable reader handle so reader identity is
/// predictable across reopens.
pub(crate) struct StubManager {
	name: String,
	pub(crate) applied: AtomicUsize,
	pub(crate) closed: AtomicBool,
	reader: ReaderHandle,
}

impl StubManager {
	pub(crate) fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			applied: AtomicUsize::new(0),
			closed: AtomicBool::new(false),
			reader: reader(0),
		}
	}

	pub(crate) fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	pub(crate) fn applied_count(&self) -> usize {
		self.applied.load(Ordering::Acquire)
	}
}

impl IndexManager for StubManager {
	fn name(&self) -> &str {
		&self.name
	}

	fn apply(&self, _work: &Work) -> Result<(), RegistryError> {
		if self.is_closed() {
			return Err(RegistryError::Backend(anyhow::anyhow!(
				"partition {} is closed",
				self.name
			)));
		}
		self.applied.fetch_add(1, Ordering::AcqRel);
		Ok(())
	}

	fn open_reader(&self) -> Result<ReaderHandle, RegistryError> {
		if self.is_closed() {
			return Err(RegistryError::Backend(anyhow::anyhow!(
				"partition {} is closed",
				self.name
			)));
		}
		Ok(self.reader.clone())
	}

	fn close(&self) -> Result<(), RegistryError> {
		self.closed.store(true, Ordering::Release);
		Ok(())
	}
}

/// Factory stub: opens `shards` stub managers per type (default 1),
/// rejects configured keys, and keeps every handle it ever opened for
/// post-mortem assertions.
pub(crate) struct StubFactory {
	opened: Mutex<Vec<Arc<StubManager>>>,
	reject: Vec<TypeKey>,
}

impl StubFactory {
	pub(crate) fn new() -> Arc<Self> {
		Arc::new(Self {
			opened: Mutex::new(Vec::new()),
			reject: Vec::new(),
		})
	}

	pub(crate) fn rejecting(keys: &[&str]) -> Arc<Self> {
		Arc::new(Self {
			opened: Mutex::new(Vec::new()),
			reject: keys.iter().map(|k| TypeKey::new(k)).collect(),
		})
	}

	/// Every handle this factory ever opened, including rolled-back ones.
	pub(crate) fn opened_handles(&self) -> Vec<Arc<StubManager>> {
		self.opened.lock().unwrap().clone()
	}
}

impl IndexManagerFactory for StubFactory {
	fn open(
		&self,
		key: &TypeKey,
		config: &BackendConfig,
	) -> Result<Vec<Arc<dyn IndexManager>>, RegistryError> {
		if self.reject.contains(key) {
			return Err(RegistryError::InvalidConfiguration {
				key: key.clone(),
				reason: "rejected by stub factory".into(),
			});
		}
		let shards = match config.get("shards") {
			None => 1,
			Some(raw) => raw.parse::<usize>().map_err(|_| {
				RegistryError::InvalidConfiguration {
					key: key.clone(),
					reason: format!("shards must be an integer, got {raw:?}"),
				}
			})?,
		};
		let mut managers: Vec<Arc<dyn IndexManager>> = Vec::with_capacity(shards);
		for ordinal in 0..shards {
			let manager = Arc::new(StubManager::new(format!("{key}/{ordinal}")));
			self.opened.lock().unwrap().push(Arc::clone(&manager));
			managers.push(manager);
		}
		Ok(managers)
	}
}
