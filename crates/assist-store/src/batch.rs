//! Atomic multi-document writes.
//!
//! A `WriteBatch` collects set/update/delete operations and is handed to
//! [`DocumentStore::commit`](crate::DocumentStore::commit), which applies
//! all of them or none. Webhook handlers and account creation rely on this
//! to keep their document fan-out consistent.

use serde_json::Value;

/// One operation inside a batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    /// Create or replace the document.
    Set {
        collection: String,
        id: String,
        doc: Value,
    },
    /// Shallow-merge fields into an existing document. Fails the whole
    /// batch if the document does not exist.
    Update {
        collection: String,
        id: String,
        fields: Value,
    },
    /// Remove the document if present.
    Delete { collection: String, id: String },
}

/// An ordered collection of writes applied atomically.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        mut self,
        collection: impl Into<String>,
        id: impl Into<String>,
        doc: Value,
    ) -> Self {
        self.ops.push(WriteOp::Set {
            collection: collection.into(),
            id: id.into(),
            doc,
        });
        self
    }

    pub fn update(
        mut self,
        collection: impl Into<String>,
        id: impl Into<String>,
        fields: Value,
    ) -> Self {
        self.ops.push(WriteOp::Update {
            collection: collection.into(),
            id: id.into(),
            fields,
        });
        self
    }

    pub fn delete(mut self, collection: impl Into<String>, id: impl Into<String>) -> Self {
        self.ops.push(WriteOp::Delete {
            collection: collection.into(),
            id: id.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}
