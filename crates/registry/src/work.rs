//! Index work items routed by the registry.

/// Kind of index mutation carried by a [`Work`] item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkKind {
	/// Insert a new document.
	Add,
	/// Replace an existing document.
	Update,
	/// Remove a document.
	Delete,
	/// Remove a document from the index only.
	Purge,
	/// Remove every document of the type.
	PurgeAll,
	/// (Re)build a document's index entry from scratch.
	Index,
}

impl WorkKind {
	/// True for kinds that address a single entity and therefore route to
	/// exactly one partition.
	pub fn is_targeted(self) -> bool {
		!matches!(self, WorkKind::PurgeAll)
	}
}

/// Opaque document payload: ordered field/value pairs.
///
/// The registry forwards documents to index managers unchanged; field
/// semantics are the backend's concern.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
	fields: Vec<(Box<str>, Box<str>)>,
}

impl Document {
	/// Creates an empty document.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style field append.
	pub fn field(mut self, name: &str, value: &str) -> Self {
		self.fields.push((name.into(), value.into()));
		self
	}

	/// Returns the first value stored under `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.fields
			.iter()
			.find(|(n, _)| &**n == name)
			.map(|(_, v)| &**v)
	}

	/// Iterates fields in insertion order.
	pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
		self.fields.iter().map(|(n, v)| (&**n, &**v))
	}

	/// True when the document carries no fields.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

/// One unit of index work for a single entity of a single type.
#[derive(Clone, Debug)]
pub struct Work {
	/// What to do.
	pub kind: WorkKind,
	/// Entity addressed by the work item. Ignored for broadcast kinds.
	pub entity_id: u64,
	/// Payload forwarded to the partition handle.
	pub document: Document,
}

impl Work {
	/// Insert `document` under `entity_id`.
	pub fn add(entity_id: u64, document: Document) -> Self {
		Self {
			kind: WorkKind::Add,
			entity_id,
			document,
		}
	}

	/// Replace the document stored under `entity_id`.
	pub fn update(entity_id: u64, document: Document) -> Self {
		Self {
			kind: WorkKind::Update,
			entity_id,
			document,
		}
	}

	/// Remove the document stored under `entity_id`.
	pub fn delete(entity_id: u64) -> Self {
		Self {
			kind: WorkKind::Delete,
			entity_id,
			document: Document::default(),
		}
	}

	/// Remove `entity_id` from the index only.
	pub fn purge(entity_id: u64) -> Self {
		Self {
			kind: WorkKind::Purge,
			entity_id,
			document: Document::default(),
		}
	}

	/// Remove every document of the type, on every partition.
	pub fn purge_all() -> Self {
		Self {
			kind: WorkKind::PurgeAll,
			entity_id: 0,
			document: Document::default(),
		}
	}

	/// Rebuild the index entry for `entity_id`.
	pub fn index(entity_id: u64, document: Document) -> Self {
		Self {
			kind: WorkKind::Index,
			entity_id,
			document,
		}
	}
}
