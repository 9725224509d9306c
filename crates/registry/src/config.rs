//! Opaque backend configuration forwarded to index-manager factories.
//!
//! The registry never interprets individual settings: it resolves the
//! effective entries for a type and hands them to the
//! [`crate::manager::IndexManagerFactory`] unchanged. What the keys mean is
//! a contract between the host and the backend implementation.

use rustc_hash::FxHashMap;

use crate::key::TypeKey;

/// Key-value settings for one indexable type's backend.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BackendConfig {
	entries: FxHashMap<Box<str>, Box<str>>,
}

impl BackendConfig {
	/// Creates an empty configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insertion.
	pub fn with(mut self, key: &str, value: &str) -> Self {
		self.set(key, value);
		self
	}

	/// Inserts or replaces one setting.
	pub fn set(&mut self, key: &str, value: &str) {
		self.entries.insert(key.into(), value.into());
	}

	/// Returns the value for `key`, if present.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.entries.get(key).map(|v| &**v)
	}

	/// Number of settings.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// True when no settings are present.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates settings in unspecified order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(k, v)| (&**k, &**v))
	}

	/// Returns these settings overlaid on `defaults`: entries present here
	/// win, everything else falls back to the default value.
	pub fn merged_over(&self, defaults: &BackendConfig) -> BackendConfig {
		let mut entries = defaults.entries.clone();
		for (k, v) in &self.entries {
			entries.insert(k.clone(), v.clone());
		}
		BackendConfig { entries }
	}
}

/// Source of persisted per-type backend settings.
pub trait ConfigSource: Send + Sync {
	/// Returns the effective settings for the given type.
	fn settings_for(&self, key: &TypeKey) -> BackendConfig;
}

/// Default settings overlaid by per-type entries.
///
/// A per-type entry only needs to name the settings it overrides; the rest
/// resolve from the defaults.
#[derive(Clone, Debug, Default)]
pub struct LayeredConfig {
	defaults: BackendConfig,
	per_type: FxHashMap<TypeKey, BackendConfig>,
}

impl LayeredConfig {
	/// Creates a source with the given defaults and no overrides.
	pub fn new(defaults: BackendConfig) -> Self {
		Self {
			defaults,
			per_type: FxHashMap::default(),
		}
	}

	/// Builder-style per-type override.
	pub fn with_type(mut self, key: impl Into<TypeKey>, config: BackendConfig) -> Self {
		self.per_type.insert(key.into(), config);
		self
	}
}

impl ConfigSource for LayeredConfig {
	fn settings_for(&self, key: &TypeKey) -> BackendConfig {
		match self.per_type.get(key) {
			Some(overrides) => overrides.merged_over(&self.defaults),
			None => self.defaults.clone(),
		}
	}
}
