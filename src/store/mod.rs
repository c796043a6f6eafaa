pub mod disk;
pub mod memory;

use crate::core::config::{AppConfig, StoreBackend};
use crate::core::store::DocumentStore;
use anyhow::{Context, Result};
use disk::DiskStore;
use memory::MemoryStore;
use std::sync::Arc;
use tracing::info;

/// Opens the document store selected by `config.store.backend`.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Disk => {
            let path = config.data_path()?.join("documents");
            let store = DiskStore::open(&path)
                .with_context(|| format!("Failed to open document store at {}", path.display()))?;
            info!("Using disk document store at {}", path.display());
            Ok(Arc::new(store))
        }
    }
}
