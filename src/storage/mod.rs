//! Key-value storage backends for glossaries

#[cfg(test)]
pub mod memory;
pub mod proxy;
pub mod sqlite;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[cfg(test)]
pub use memory::MemoryStore;
pub use proxy::StoreProxy;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("storage worker is no longer running")]
    Disconnected,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage collaborator used by the glossary repository.
///
/// `put` must be atomic for a single key. No ordering is promised across
/// keys, and concurrent writes to the same key resolve last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;
    async fn put(&self, key: &str, value: String) -> StorageResult<()>;
    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;
    async fn list_keys(&self) -> StorageResult<Vec<String>>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: String) -> StorageResult<()> {
        (**self).put(key, value).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key).await
    }

    async fn list_keys(&self) -> StorageResult<Vec<String>> {
        (**self).list_keys().await
    }
}

/// Open the SQLite store at `path`, optionally behind a background worker.
pub fn open(path: &Path, background: bool) -> StorageResult<Arc<dyn KeyValueStore>> {
    let store = SqliteStore::open(path)?;
    if background {
        Ok(Arc::new(StoreProxy::spawn(store)))
    } else {
        Ok(Arc::new(store))
    }
}
