//! Keyed JSON document storage.

use crate::core::error::{DashboardError, Result};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

pub const REGISTRATIONS: &str = "registrations";
pub const NOTIFICATIONS: &str = "notifications";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("disk store error: {0}")]
    Disk(#[from] fjall::Error),

    #[error("document is not a JSON object")]
    NotAnObject,
}

/// Document storage with atomic single-document writes. Documents are JSON
/// objects whose `id` field always equals their key.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores `doc` under a freshly generated id and returns that id.
    async fn create(&self, collection: &str, doc: Value) -> Result<String, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Replaces the document stored under `id`. Returns false when there is none.
    async fn update(&self, collection: &str, id: &str, doc: Value) -> Result<bool, StoreError>;

    /// Returns false when there was nothing to delete.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    async fn find_one_where(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Option<Value>, StoreError> {
        Ok(self
            .list(collection)
            .await?
            .into_iter()
            .find(|doc| doc.get(field) == Some(value)))
    }

    async fn count(&self, collection: &str) -> Result<usize, StoreError> {
        Ok(self.list(collection).await?.len())
    }
}

/// Writes `id` into the document's `id` field.
pub(crate) fn with_id(mut doc: Value, id: &str) -> Result<Value, StoreError> {
    doc.as_object_mut()
        .ok_or(StoreError::NotAnObject)?
        .insert("id".to_string(), Value::String(id.to_string()));
    Ok(doc)
}

/// Typed view of one collection.
pub struct Documents<T> {
    store: Arc<dyn DocumentStore>,
    collection: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Documents<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collection: self.collection,
            _marker: PhantomData,
        }
    }
}

impl<T> Documents<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(store: Arc<dyn DocumentStore>, collection: &'static str) -> Self {
        Self {
            store,
            collection,
            _marker: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    pub async fn create(&self, doc: &T) -> Result<String> {
        let value = serde_json::to_value(doc).map_err(StoreError::from)?;
        Ok(self.store.create(self.collection, value).await?)
    }

    pub async fn get(&self, id: &str) -> Result<T> {
        match self.store.get(self.collection, id).await? {
            Some(value) => Self::decode(value),
            None => Err(self.not_found(id)),
        }
    }

    pub async fn list(&self) -> Result<Vec<T>> {
        self.store
            .list(self.collection)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    pub async fn update(&self, id: &str, doc: &T) -> Result<()> {
        let value = serde_json::to_value(doc).map_err(StoreError::from)?;
        if self.store.update(self.collection, id, value).await? {
            Ok(())
        } else {
            Err(self.not_found(id))
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.store.delete(self.collection, id).await? {
            Ok(())
        } else {
            Err(self.not_found(id))
        }
    }

    pub async fn find_one_where(&self, field: &str, value: impl Into<Value>) -> Result<Option<T>> {
        self.store
            .find_one_where(self.collection, field, &value.into())
            .await?
            .map(Self::decode)
            .transpose()
    }

    pub async fn count(&self) -> Result<usize> {
        Ok(self.store.count(self.collection).await?)
    }

    fn decode(value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| DashboardError::Store(e.into()))
    }

    fn not_found(&self, id: &str) -> DashboardError {
        DashboardError::NotFound {
            collection: self.collection,
            id: id.to_string(),
        }
    }
}
