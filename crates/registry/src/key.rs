//! Stable identity keys for indexable types.

use std::fmt;
use std::sync::Arc;

/// Identifier of one indexable type.
///
/// Keys are cheap to clone, compare, and hash; the registry treats them as
/// opaque. Callers supply explicit keys at registration time rather than
/// deriving them from runtime type machinery.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey(Arc<str>);

impl TypeKey {
	/// Creates a key from any string-like value.
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref()))
	}

	/// Returns the key as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("TypeKey").field(&self.as_str()).finish()
	}
}

impl From<&str> for TypeKey {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for TypeKey {
	fn from(name: String) -> Self {
		Self(Arc::from(name))
	}
}

impl AsRef<str> for TypeKey {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}
