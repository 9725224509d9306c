//! Factory opening in-memory partition sets from backend settings.

use std::sync::Arc;

use quarry_registry::{
	BackendConfig, IndexManager, IndexManagerFactory, RegistryError, TypeKey,
};

use crate::manager::MemIndexManager;

/// Backend selector setting. When present it must name this backend.
pub const SETTING_BACKEND: &str = "backend";

/// Partition count setting. Defaults to one partition per type.
pub const SETTING_SHARDS: &str = "shards";

const BACKEND_NAME: &str = "mem";

/// Opens [`MemIndexManager`] partition sets.
///
/// Settings are validated here, at registration time, so a bad entry
/// surfaces as [`RegistryError::InvalidConfiguration`] before anything is
/// published.
#[derive(Debug, Default)]
pub struct MemFactory;

impl MemFactory {
	pub fn new() -> Arc<Self> {
		Arc::new(Self)
	}
}

impl IndexManagerFactory for MemFactory {
	fn open(
		&self,
		key: &TypeKey,
		config: &BackendConfig,
	) -> Result<Vec<Arc<dyn IndexManager>>, RegistryError> {
		if let Some(backend) = config.get(SETTING_BACKEND)
			&& backend != BACKEND_NAME
		{
			return Err(RegistryError::InvalidConfiguration {
				key: key.clone(),
				reason: format!("unsupported backend {backend:?}, expected {BACKEND_NAME:?}"),
			});
		}
		let shards = match config.get(SETTING_SHARDS) {
			None => 1,
			Some(raw) => match raw.parse::<usize>() {
				Ok(n) if n >= 1 => n,
				_ => {
					return Err(RegistryError::InvalidConfiguration {
						key: key.clone(),
						reason: format!("shards must be a positive integer, got {raw:?}"),
					});
				}
			},
		};
		let managers = (0..shards)
			.map(|ordinal| {
				Arc::new(MemIndexManager::open(format!("{key}/{ordinal}")))
					as Arc<dyn IndexManager>
			})
			.collect();
		tracing::debug!(%key, shards, "opened in-memory partitions");
		Ok(managers)
	}
}
