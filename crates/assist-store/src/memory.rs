//! In-memory store backend.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::batch::{WriteBatch, WriteOp};
use crate::error::StoreError;
use crate::{lookup_path, DocumentStore};

/// Collection map shared by the memory and file backends.
///
/// All mutation goes through [`Collections::apply`], so a batch is atomic
/// by construction: validation happens before any write, under the same
/// write lock.
#[derive(Default)]
pub(crate) struct Collections {
    map: RwLock<HashMap<String, HashMap<String, Value>>>,
}

impl Collections {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let map = self.map.read().map_err(|_| StoreError::Lock)?;
        Ok(map.get(collection).and_then(|c| c.get(id)).cloned())
    }

    pub(crate) fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        let map = self.map.read().map_err(|_| StoreError::Lock)?;
        let mut docs: Vec<(String, Value)> = map
            .get(collection)
            .map(|c| c.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        docs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(docs)
    }

    pub(crate) fn find(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        let mut docs = self.list(collection)?;
        docs.retain(|(_, doc)| lookup_path(doc, field) == Some(value));
        Ok(docs)
    }

    /// Apply a list of operations atomically. Returns the collections that
    /// were touched, for backends that persist per collection.
    pub(crate) fn apply(&self, ops: Vec<WriteOp>) -> Result<Vec<String>, StoreError> {
        let mut map = self.map.write().map_err(|_| StoreError::Lock)?;

        // Validate the whole batch before writing anything. The overlay
        // tracks existence changes made by earlier ops in the same batch.
        let mut overlay: HashMap<(String, String), bool> = HashMap::new();
        for op in &ops {
            match op {
                WriteOp::Set { collection, id, .. } => {
                    overlay.insert((collection.clone(), id.clone()), true);
                }
                WriteOp::Update {
                    collection,
                    id,
                    fields,
                } => {
                    if !fields.is_object() {
                        return Err(StoreError::InvalidUpdate);
                    }
                    let key = (collection.clone(), id.clone());
                    let exists = overlay.get(&key).copied().unwrap_or_else(|| {
                        map.get(collection).is_some_and(|c| c.contains_key(id))
                    });
                    if !exists {
                        return Err(StoreError::NotFound(format!("{}/{}", collection, id)));
                    }
                }
                WriteOp::Delete { collection, id } => {
                    overlay.insert((collection.clone(), id.clone()), false);
                }
            }
        }

        let mut touched = Vec::new();
        for op in ops {
            match op {
                WriteOp::Set { collection, id, doc } => {
                    map.entry(collection.clone()).or_default().insert(id, doc);
                    touched.push(collection);
                }
                WriteOp::Update {
                    collection,
                    id,
                    fields,
                } => {
                    let doc = map
                        .get_mut(&collection)
                        .and_then(|c| c.get_mut(&id))
                        .ok_or_else(|| StoreError::NotFound(format!("{}/{}", collection, id)))?;
                    merge_fields(doc, &fields)?;
                    touched.push(collection);
                }
                WriteOp::Delete { collection, id } => {
                    if let Some(c) = map.get_mut(&collection) {
                        c.remove(&id);
                    }
                    touched.push(collection);
                }
            }
        }
        touched.dedup();
        Ok(touched)
    }

    /// Current contents of one collection, for persistence.
    pub(crate) fn snapshot(&self, collection: &str) -> Result<HashMap<String, Value>, StoreError> {
        let map = self.map.read().map_err(|_| StoreError::Lock)?;
        Ok(map.get(collection).cloned().unwrap_or_default())
    }

    /// Seed a document without going through `apply` (startup load).
    pub(crate) fn seed(&self, collection: &str, id: String, doc: Value) -> Result<(), StoreError> {
        let mut map = self.map.write().map_err(|_| StoreError::Lock)?;
        map.entry(collection.to_string()).or_default().insert(id, doc);
        Ok(())
    }
}

/// Shallow merge: top-level fields of `fields` replace those of `doc`.
fn merge_fields(doc: &mut Value, fields: &Value) -> Result<(), StoreError> {
    let (Some(target), Some(source)) = (doc.as_object_mut(), fields.as_object()) else {
        return Err(StoreError::InvalidUpdate);
    };
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
    Ok(())
}

/// In-memory store (contents lost at process exit).
pub struct MemoryStore {
    collections: Collections,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Collections::new(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.collections.get(collection, id)
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        self.collections
            .apply(vec![WriteOp::Set {
                collection: collection.to_string(),
                id: id.to_string(),
                doc,
            }])
            .map(|_| ())
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError> {
        self.collections
            .apply(vec![WriteOp::Update {
                collection: collection.to_string(),
                id: id.to_string(),
                fields,
            }])
            .map(|_| ())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.collections
            .apply(vec![WriteOp::Delete {
                collection: collection.to_string(),
                id: id.to_string(),
            }])
            .map(|_| ())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError> {
        self.collections.list(collection)
    }

    async fn find(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        self.collections.find(collection, field, value)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.collections.apply(batch.into_ops()).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = MemoryStore::new();
        store
            .set("users", "u1", json!({"email": "jane@x.com"}))
            .await
            .unwrap();

        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc["email"], "jane@x.com");
    }

    #[tokio::test]
    async fn update_missing_document_fails() {
        let store = MemoryStore::new();
        let err = store
            .update("users", "ghost", json!({"a": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_is_shallow_merge() {
        let store = MemoryStore::new();
        store
            .set("users", "u1", json!({"a": 1, "b": {"x": 1}}))
            .await
            .unwrap();
        store
            .update("users", "u1", json!({"b": {"y": 2}, "c": 3}))
            .await
            .unwrap();

        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc["a"], 1);
        assert_eq!(doc["b"], json!({"y": 2}));
        assert_eq!(doc["c"], 3);
    }

    #[tokio::test]
    async fn failed_batch_writes_nothing() {
        let store = MemoryStore::new();
        let batch = WriteBatch::new()
            .set("users", "u1", json!({"a": 1}))
            .update("subscribers", "ghost", json!({"b": 2}));

        assert!(store.commit(batch).await.is_err());
        // The set in the same batch must not have been applied.
        assert!(store.get("users", "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_update_can_target_earlier_set() {
        let store = MemoryStore::new();
        let batch = WriteBatch::new()
            .set("users", "u1", json!({"a": 1}))
            .update("users", "u1", json!({"b": 2}));

        store.commit(batch).await.unwrap();
        let doc = store.get("users", "u1").await.unwrap().unwrap();
        assert_eq!(doc["b"], 2);
    }

    #[tokio::test]
    async fn find_matches_dotted_paths() {
        let store = MemoryStore::new();
        store
            .set(
                "subscribers",
                "u1",
                json!({"subscription": {"customerId": "cus_1"}}),
            )
            .await
            .unwrap();
        store
            .set(
                "subscribers",
                "u2",
                json!({"subscription": {"customerId": "cus_2"}}),
            )
            .await
            .unwrap();

        let hits = store
            .find("subscribers", "subscription.customerId", &json!("cus_2"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "u2");
    }
}
