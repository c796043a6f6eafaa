use crate::core::id::generate_id;
use crate::core::store::{DocumentStore, StoreError, with_id};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;
use tokio::sync::Mutex;
use tracing::debug;

/// Document store persisted in a fjall keyspace, one partition per collection.
pub struct DiskStore {
    keyspace: Keyspace,
    partitions: RwLock<HashMap<String, PartitionHandle>>,
    // Serializes read-modify-write sequences such as update-if-present.
    writes: Mutex<()>,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)
            .map_err(|e| StoreError::Backend(format!("{}: {e}", path.display())))?;
        let keyspace = fjall::Config::new(path).open()?;
        debug!("Opened disk store at {}", path.display());
        Ok(Self {
            keyspace,
            partitions: RwLock::new(HashMap::new()),
            writes: Mutex::new(()),
        })
    }

    fn partition(&self, collection: &str) -> Result<PartitionHandle, StoreError> {
        if let Some(partition) = self
            .partitions
            .read()
            .map_err(|_| poisoned())?
            .get(collection)
        {
            return Ok(partition.clone());
        }

        let mut partitions = self.partitions.write().map_err(|_| poisoned())?;
        if let Some(partition) = partitions.get(collection) {
            return Ok(partition.clone());
        }
        let partition = self
            .keyspace
            .open_partition(collection, PartitionCreateOptions::default())?;
        partitions.insert(collection.to_string(), partition.clone());
        Ok(partition)
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("partition map lock poisoned".to_string())
}

#[async_trait]
impl DocumentStore for DiskStore {
    async fn create(&self, collection: &str, doc: Value) -> Result<String, StoreError> {
        let id = generate_id();
        let doc = with_id(doc, &id)?;
        let partition = self.partition(collection)?;

        let _guard = self.writes.lock().await;
        partition.insert(id.as_str(), serde_json::to_vec(&doc)?)?;
        debug!(%collection, %id, "Document CREATE");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let partition = self.partition(collection)?;
        match partition.get(id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let partition = self.partition(collection)?;
        partition
            .iter()
            .map(|entry| -> Result<Value, StoreError> {
                let (_, bytes) = entry?;
                Ok(serde_json::from_slice(&bytes)?)
            })
            .collect()
    }

    async fn update(&self, collection: &str, id: &str, doc: Value) -> Result<bool, StoreError> {
        let doc = with_id(doc, id)?;
        let partition = self.partition(collection)?;

        let _guard = self.writes.lock().await;
        if !partition.contains_key(id)? {
            return Ok(false);
        }
        partition.insert(id, serde_json::to_vec(&doc)?)?;
        debug!(%collection, %id, "Document UPDATE");
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let partition = self.partition(collection)?;

        let _guard = self.writes.lock().await;
        if !partition.contains_key(id)? {
            return Ok(false);
        }
        partition.remove(id)?;
        debug!(%collection, %id, "Document DELETE");
        Ok(true)
    }
}
