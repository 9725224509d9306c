//! Heap-backed index partitions with generation-stamped readers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};

use quarry_registry::{
	Document, IndexManager, IndexReader, ReaderHandle, RegistryError, Work, WorkKind,
};

/// Point-in-time snapshot of one partition's documents.
///
/// Built once per store generation and shared by every handle opened while
/// that generation is current. Later writes to the partition never show
/// through an already-open reader.
pub struct MemReader {
	docs: BTreeMap<u64, Document>,
	generation: u64,
}

impl MemReader {
	/// Store generation this reader was taken at.
	pub fn generation(&self) -> u64 {
		self.generation
	}
}

impl IndexReader for MemReader {
	fn num_docs(&self) -> u64 {
		self.docs.len() as u64
	}

	fn matching(&self, field: &str, term: &str) -> Vec<u64> {
		// BTreeMap iteration yields ascending entity ids.
		self.docs
			.iter()
			.filter(|(_, doc)| doc.get(field) == Some(term))
			.map(|(id, _)| *id)
			.collect()
	}
}

impl fmt::Debug for MemReader {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemReader")
			.field("docs", &self.docs.len())
			.field("generation", &self.generation)
			.finish()
	}
}

struct Store {
	docs: BTreeMap<u64, Document>,
	generation: u64,
}

struct ReaderSlot {
	generation: u64,
	handle: Option<ReaderHandle>,
}

/// One in-memory index partition.
///
/// Writes go through [`IndexManager::apply`] and bump the store generation;
/// [`IndexManager::open_reader`] reuses the cached handle while the
/// generation is unchanged, so an untouched partition yields
/// identity-equal handles across reopens.
pub struct MemIndexManager {
	name: Box<str>,
	store: RwLock<Store>,
	reader: Mutex<ReaderSlot>,
	closed: AtomicBool,
}

impl MemIndexManager {
	/// Opens an empty partition under the given name.
	pub fn open(name: impl Into<Box<str>>) -> Self {
		Self {
			name: name.into(),
			store: RwLock::new(Store {
				docs: BTreeMap::new(),
				generation: 0,
			}),
			reader: Mutex::new(ReaderSlot {
				generation: 0,
				handle: None,
			}),
			closed: AtomicBool::new(false),
		}
	}

	/// True once [`IndexManager::close`] has run.
	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	/// Documents currently stored in this partition.
	pub fn len(&self) -> usize {
		self.store.read().docs.len()
	}

	/// True when the partition stores no documents.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn ensure_open(&self) -> Result<(), RegistryError> {
		if self.is_closed() {
			return Err(RegistryError::Backend(anyhow::anyhow!(
				"partition {} is closed",
				self.name
			)));
		}
		Ok(())
	}
}

impl IndexManager for MemIndexManager {
	fn name(&self) -> &str {
		&self.name
	}

	fn apply(&self, work: &Work) -> Result<(), RegistryError> {
		self.ensure_open()?;
		let mut store = self.store.write();
		match work.kind {
			WorkKind::Add | WorkKind::Update | WorkKind::Index => {
				store.docs.insert(work.entity_id, work.document.clone());
			}
			WorkKind::Delete | WorkKind::Purge => {
				store.docs.remove(&work.entity_id);
			}
			WorkKind::PurgeAll => {
				store.docs.clear();
			}
		}
		store.generation += 1;
		Ok(())
	}

	fn open_reader(&self) -> Result<ReaderHandle, RegistryError> {
		self.ensure_open()?;
		let store = self.store.read();
		let mut slot = self.reader.lock();
		if let Some(handle) = &slot.handle
			&& slot.generation == store.generation
		{
			return Ok(handle.clone());
		}
		let handle = ReaderHandle::new(Arc::new(MemReader {
			docs: store.docs.clone(),
			generation: store.generation,
		}));
		slot.generation = store.generation;
		slot.handle = Some(handle.clone());
		Ok(handle)
	}

	fn close(&self) -> Result<(), RegistryError> {
		if self.closed.swap(true, Ordering::AcqRel) {
			return Ok(());
		}
		{
			let mut store = self.store.write();
			store.docs.clear();
			store.generation += 1;
		}
		self.reader.lock().handle = None;
		tracing::debug!(partition = &*self.name, "closed partition");
		Ok(())
	}
}

impl fmt::Debug for MemIndexManager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MemIndexManager")
			.field("name", &self.name)
			.field("docs", &self.len())
			.field("closed", &self.is_closed())
			.finish()
	}
}
