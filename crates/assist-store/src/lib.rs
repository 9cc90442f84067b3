//! # assist-store
//!
//! Document store abstraction for the Assist platform.
//!
//! The hosted backend exposes collections of JSON documents with atomic
//! multi-document writes. This crate models that surface as the
//! [`DocumentStore`] trait with two backends:
//!
//! - [`MemoryStore`]: in-memory only, used by tests and dev runs
//! - [`FileStore`]: JSON Lines file per collection, reloaded at startup
//!
//! Documents are addressed by `(collection, id)`. Sub-collections are plain
//! collection strings (e.g. `users/u1/profile`), so the trait stays flat.

pub mod batch;
pub mod error;
pub mod file;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use assist_core::config::{StoreBackend, StoreConfig};

pub use batch::{WriteBatch, WriteOp};
pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Trait for document store backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, or `None` if absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError>;

    /// Create or replace a document.
    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError>;

    /// Shallow-merge fields into an existing document.
    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError>;

    /// Remove a document if present.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// All documents in a collection, ordered by id.
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, StoreError>;

    /// Documents whose `field` (dotted path) equals `value`.
    async fn find(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Value)>, StoreError>;

    /// Apply a batch of writes atomically: all of them or none.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

/// Create a store backend based on configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::File => Ok(Arc::new(FileStore::new(&config.directory)?)),
    }
}

/// Look up a dotted field path inside a JSON value.
pub(crate) fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_path_walks_nested_objects() {
        let doc = json!({"subscription": {"customerId": "cus_1"}});
        assert_eq!(
            lookup_path(&doc, "subscription.customerId"),
            Some(&json!("cus_1"))
        );
        assert_eq!(lookup_path(&doc, "subscription.missing"), None);
    }

    #[test]
    fn create_store_honors_backend_choice() {
        let config = StoreConfig::default();
        assert!(create_store(&config).is_ok());
    }
}
