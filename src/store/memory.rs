use crate::core::id::generate_id;
use crate::core::store::{DocumentStore, StoreError, with_id};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

type Collection = BTreeMap<String, Value>;

/// In-memory document store. Contents are lost when the process exits.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, Collection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(&self, collection: &str, doc: Value) -> Result<String, StoreError> {
        let id = generate_id();
        let doc = with_id(doc, &id)?;

        let mut collections = self.inner.lock().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), doc);
        debug!(%collection, %id, "Document CREATE");
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = self.inner.lock().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.inner.lock().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn update(&self, collection: &str, id: &str, doc: Value) -> Result<bool, StoreError> {
        let doc = with_id(doc, id)?;

        let mut collections = self.inner.lock().await;
        match collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
        {
            Some(existing) => {
                *existing = doc;
                debug!(%collection, %id, "Document UPDATE");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.inner.lock().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        debug!(%collection, %id, removed, "Document DELETE");
        Ok(removed)
    }

    async fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let collections = self.inner.lock().await;
        Ok(collections.get(collection).map_or(0, |docs| docs.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DashboardError;
    use crate::core::store::Documents;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_get_list() {
        let store = MemoryStore::new();

        let id = store
            .create("things", json!({"name": "first", "id": "ignored"}))
            .await
            .unwrap();

        let doc = store.get("things", &id).await.unwrap().unwrap();
        assert_eq!(doc["name"], "first");
        assert_eq!(doc["id"], id.as_str());

        store.create("things", json!({"name": "second"})).await.unwrap();
        assert_eq!(store.list("things").await.unwrap().len(), 2);
        assert_eq!(store.count("things").await.unwrap(), 2);

        assert!(store.get("things", "00000000").await.unwrap().is_none());
        assert!(store.list("other").await.unwrap().is_empty());
        assert_eq!(store.count("other").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_rejects_non_objects() {
        let store = MemoryStore::new();
        let err = store.create("things", json!([1, 2])).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject));
    }

    #[tokio::test]
    async fn test_update_keeps_id() {
        let store = MemoryStore::new();
        let id = store.create("things", json!({"name": "old"})).await.unwrap();

        let updated = store
            .update("things", &id, json!({"name": "new", "id": "zzzzzzzz"}))
            .await
            .unwrap();
        assert!(updated);

        let doc = store.get("things", &id).await.unwrap().unwrap();
        assert_eq!(doc["name"], "new");
        assert_eq!(doc["id"], id.as_str());

        assert!(
            !store
                .update("things", "00000000", json!({"name": "ghost"}))
                .await
                .unwrap()
        );
        assert_eq!(store.count("things").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let id = store.create("things", json!({"name": "doomed"})).await.unwrap();

        assert!(store.delete("things", &id).await.unwrap());
        assert!(!store.delete("things", &id).await.unwrap());
        assert!(store.get("things", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_one_where() {
        let store = MemoryStore::new();
        store
            .create("things", json!({"name": "a", "kind": "x"}))
            .await
            .unwrap();
        store
            .create("things", json!({"name": "b", "kind": "y"}))
            .await
            .unwrap();

        let found = store
            .find_one_where("things", "kind", &json!("y"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["name"], "b");

        assert!(
            store
                .find_one_where("things", "kind", &json!("z"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Thing {
        #[serde(default)]
        id: String,
        name: String,
    }

    #[tokio::test]
    async fn test_typed_documents() {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let things = Documents::<Thing>::new(store, "things");

        let id = things
            .create(&Thing {
                id: String::new(),
                name: "widget".to_string(),
            })
            .await
            .unwrap();

        let thing = things.get(&id).await.unwrap();
        assert_eq!(thing.id, id);
        assert_eq!(thing.name, "widget");

        let by_name = things.find_one_where("name", "widget").await.unwrap();
        assert_eq!(by_name, Some(thing.clone()));

        let renamed = Thing {
            name: "gadget".to_string(),
            ..thing
        };
        things.update(&id, &renamed).await.unwrap();
        assert_eq!(things.list().await.unwrap(), vec![renamed]);

        things.delete(&id).await.unwrap();
        assert_eq!(things.count().await.unwrap(), 0);

        let err = things.get(&id).await.unwrap_err();
        assert!(matches!(err, DashboardError::NotFound { collection: "things", .. }));
        let err = things.delete(&id).await.unwrap_err();
        assert!(matches!(err, DashboardError::NotFound { .. }));
    }
}
