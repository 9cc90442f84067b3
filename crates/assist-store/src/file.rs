//! File-backed store.
//!
//! One JSON Lines file per collection under the data directory. Writes go
//! to the in-memory collection map first (atomic), then the touched
//! collections are rewritten to disk. Startup reloads every `*.jsonl` file,
//! last entry per id winning, so a restart resumes where the process left
//! off.
//!
//! Collection names may contain `/` (profile sub-collections); file names
//! encode that as `__`.

use async_trait::async_trait;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::batch::{WriteBatch, WriteOp};
use crate::error::StoreError;
use crate::memory::Collections;
use crate::DocumentStore;

const FILE_SUFFIX: &str = ".jsonl";

/// Persistent JSON Lines store.
pub struct FileStore {
    directory: PathBuf,
    collections: Collections,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Line {
    id: String,
    doc: Value,
}

impl FileStore {
    /// Open (and create if needed) a file store rooted at `directory`.
    pub fn new(directory: impl AsRef<Path>) -> Result<Self, StoreError> {
        let directory = directory.as_ref().to_path_buf();
        if !directory.exists() {
            fs::create_dir_all(&directory)?;
        }

        let store = Self {
            directory,
            collections: Collections::new(),
        };
        store.load_all()?;
        Ok(store)
    }

    fn file_for(&self, collection: &str) -> PathBuf {
        let encoded = collection.replace('/', "__");
        self.directory.join(format!("{}{}", encoded, FILE_SUFFIX))
    }

    fn collection_for(file_name: &str) -> Option<String> {
        file_name
            .strip_suffix(FILE_SUFFIX)
            .map(|stem| stem.replace("__", "/"))
    }

    fn load_all(&self) -> Result<(), StoreError> {
        let mut loaded = 0usize;
        for entry in fs::read_dir(&self.directory)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(collection) = Self::collection_for(name) else {
                continue;
            };

            let file = fs::File::open(entry.path())?;
            let reader = BufReader::new(file);
            for (line_num, line) in reader.lines().enumerate() {
                let line = line?;
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<Line>(line) {
                    Ok(parsed) => {
                        self.collections.seed(&collection, parsed.id, parsed.doc)?;
                        loaded += 1;
                    }
                    Err(e) => {
                        tracing::warn!(
                            "skipping malformed line {} of {}: {}",
                            line_num + 1,
                            entry.path().display(),
                            e
                        );
                    }
                }
            }
        }
        if loaded > 0 {
            tracing::info!(documents = loaded, "loaded document store from disk");
        }
        Ok(())
    }

    fn rewrite_collection(&self, collection: &str) -> Result<(), StoreError> {
        let snapshot = self.collections.snapshot(collection)?;
        let path = self.file_for(collection);

        if snapshot.is_empty() {
            if path.exists() {
                fs::remove_file(&path)?;
            }
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut ids: Vec<_> = snapshot.keys().cloned().collect();
        ids.sort();
        for id in ids {
            let line = Line {
                doc: snapshot[&id].clone(),
                id,
            };
            writeln!(file, "{}", serde_json::to_string(&line)?)?;
        }
        Ok(())
    }

    fn persist(&self, touched: Vec<String>) -> Result<(), StoreError> {
        for collection in touched {
            self.rewrite_collection(&collection)?;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        self.collections.get(collection, id)
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let touched = self.collections.apply(vec![WriteOp::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            doc,
        }])?;
        self.persist(touched)
    }

    async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError> {
        let touched = self.collections.apply(vec![WriteOp::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        }])?;
        self.persist(touched)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let touched = self.collections.apply(vec![WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        }])?;
        self.persist(touched)
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
        let touched = self.collections.apply(batch.into_ops())?;
        self.persist(touched)
    }
}
