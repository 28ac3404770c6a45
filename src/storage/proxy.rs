//! Message-passing proxy to a store owned by a background task
//!
//! Requests are served one at a time in arrival order, so operations on a
//! single key apply in the order they were sent.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use super::{KeyValueStore, StorageError, StorageResult};

const CHANNEL_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<StorageResult<T>>;

enum Request {
    Get {
        key: String,
        reply: Reply<Option<String>>,
    },
    Put {
        key: String,
        value: String,
        reply: Reply<()>,
    },
    Delete {
        key: String,
        reply: Reply<()>,
    },
    ListKeys {
        reply: Reply<Vec<String>>,
    },
}

#[derive(Clone)]
pub struct StoreProxy {
    tx: mpsc::Sender<Request>,
}

impl StoreProxy {
    /// Move `store` onto a background task and return a handle to it.
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(store: S) -> Self
    where
        S: KeyValueStore + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(serve(store, rx));
        Self { tx }
    }

    async fn call<T, F>(&self, make: F) -> StorageResult<T>
    where
        T: Send,
        F: FnOnce(Reply<T>) -> Request,
    {
        let (reply, response) = oneshot::channel();
        let request = make(reply);
        self.tx
            .send(request)
            .await
            .map_err(|_| StorageError::Disconnected)?;
        response.await.map_err(|_| StorageError::Disconnected)?
    }
}

async fn serve<S: KeyValueStore>(store: S, mut rx: mpsc::Receiver<Request>) {
    while let Some(request) = rx.recv().await {
        // A dropped receiver means the caller stopped waiting; the effect stands.
        match request {
            Request::Get { key, reply } => {
                let _ = reply.send(store.get(&key).await);
            }
            Request::Put { key, value, reply } => {
                let _ = reply.send(store.put(&key, value).await);
            }
            Request::Delete { key, reply } => {
                let _ = reply.send(store.delete(&key).await);
            }
            Request::ListKeys { reply } => {
                let _ = reply.send(store.list_keys().await);
            }
        }
    }
    tracing::debug!("Storage worker stopped");
}

#[async_trait]
impl KeyValueStore for StoreProxy {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let key = key.to_string();
        self.call(|reply| Request::Get { key, reply }).await
    }

    async fn put(&self, key: &str, value: String) -> StorageResult<()> {
        let key = key.to_string();
        self.call(|reply| Request::Put { key, value, reply }).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let key = key.to_string();
        self.call(|reply| Request::Delete { key, reply }).await
    }

    async fn list_keys(&self) -> StorageResult<Vec<String>> {
        self.call(|reply| Request::ListKeys { reply }).await
    }
}
