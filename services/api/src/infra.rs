use hexaco_profile::config::StorageConfig;
use hexaco_profile::error::AppError;
use hexaco_profile::workflows::questionnaire::{
    DirectoryDocumentStore, DocumentStore, MemoryDocumentStore, StoreError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::Value;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Backend chosen by `HEXACO_STORE_DIR`.
pub(crate) enum ConfiguredStore {
    Memory(MemoryDocumentStore),
    Directory(DirectoryDocumentStore),
}

impl ConfiguredStore {
    pub(crate) fn open(config: &StorageConfig) -> Result<Self, AppError> {
        match config {
            StorageConfig::Memory => Ok(Self::Memory(MemoryDocumentStore::new())),
            StorageConfig::Directory(root) => {
                Ok(Self::Directory(DirectoryDocumentStore::open(root.clone())?))
            }
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "memory".to_string(),
            Self::Directory(store) => store.root().display().to_string(),
        }
    }
}

impl DocumentStore for ConfiguredStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self {
            Self::Memory(store) => store.get(key),
            Self::Directory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, document: Value) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.set(key, document),
            Self::Directory(store) => store.set(key, document),
        }
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.delete(key),
            Self::Directory(store) => store.delete(key),
        }
    }
}
