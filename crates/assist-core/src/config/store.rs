//! Document store backend settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which backend holds the document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// In-memory only; contents are lost at process exit.
    Memory,
    /// JSON Lines files under `directory`, reloaded at startup.
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    /// Data directory for the file backend.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            directory: default_directory(),
        }
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_directory() -> PathBuf {
    PathBuf::from("./data")
}
