//! Blob storage backend
//!
//! The whole collection lives in a single JSON object under a fixed key.
//! Each append is an existence check, a read, a prepend + truncate, and a
//! full rewrite of the object.
//!
//! An object that fails to parse (even one bad record) is never rewritten:
//! reads and appends keep failing until it is deleted or copied to another
//! key by hand.

mod http_store;
mod memory_store;
mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

pub use http_store::HttpObjectStore;
pub use memory_store::MemoryObjectStore;
pub use redis_store::RedisObjectStore;

use crate::config::{BackendKind, BlobProvider, BlobStorageConfig};
use crate::errors::{Result, UtmLoggerError};
use crate::storage::retention::prepend_capped;
use crate::storage::{StorageConfig, UtmLog, UtmLogStore};

/// Content type attached to the stored document
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Minimal key → document store used by [`BlobStorage`]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool>;
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, body: String, content_type: &str) -> Result<()>;
    /// Publicly readable location of `key`
    fn public_url(&self, key: &str) -> String;
    fn provider_name(&self) -> &'static str;
}

pub struct BlobStorage {
    store: Arc<dyn ObjectStore>,
    key: String,
    retention_cap: usize,
    write_lock: Mutex<()>,
}

impl BlobStorage {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>, retention_cap: usize) -> Self {
        BlobStorage {
            store,
            key: key.into(),
            retention_cap,
            write_lock: Mutex::new(()),
        }
    }

    pub async fn from_config(config: &BlobStorageConfig) -> Result<Self> {
        if config.key.is_empty() {
            return Err(UtmLoggerError::validation("storage.blob.key must not be empty"));
        }

        let store: Arc<dyn ObjectStore> = match config.provider {
            BlobProvider::Http => Arc::new(HttpObjectStore::new(
                &config.base_url,
                config.token.clone(),
                config.timeout_secs,
            )?),
            BlobProvider::Redis => Arc::new(RedisObjectStore::new(&config.redis_url)?),
            BlobProvider::Memory => Arc::new(MemoryObjectStore::new()),
        };

        Ok(Self::new(store, &config.key, config.retention_cap))
    }

    /// Public URL of the stored document
    pub fn url(&self) -> String {
        self.store.public_url(&self.key)
    }

    async fn read_document(&self) -> Result<Vec<UtmLog>> {
        // 首次使用时对象不存在，先探测再读取
        if !self.store.exists(&self.key).await? {
            debug!("Blob {} does not exist yet, treating as empty", self.key);
            return Ok(Vec::new());
        }

        let Some(body) = self.store.get(&self.key).await? else {
            return Ok(Vec::new());
        };

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<UtmLog>>(&body).map_err(|e| {
            error!(
                "Failed to parse blob {}: {}. Appends are refused until the object is \
                 repaired, or moved aside to another key",
                self.url(),
                e
            );
            UtmLoggerError::serialization(format!(
                "Failed to parse blob {}: {}; move it aside to start a new log",
                self.key, e
            ))
        })
    }
}

#[async_trait]
impl UtmLogStore for BlobStorage {
    async fn try_load(&self) -> Result<Vec<UtmLog>> {
        self.read_document().await
    }

    async fn append(&self, log: UtmLog) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut logs = self.read_document().await?;
        prepend_capped(&mut logs, log, self.retention_cap);

        let body = serde_json::to_string(&logs)?;
        self.store.put(&self.key, body, JSON_CONTENT_TYPE).await?;

        info!(
            "Saved UTM log to {} blob {} ({} entries)",
            self.store.provider_name(),
            self.key,
            logs.len()
        );
        Ok(())
    }

    fn backend_config(&self) -> StorageConfig {
        StorageConfig {
            backend: BackendKind::Blob,
            retention_cap: Some(self.retention_cap),
            read_limit: None,
            location: self.url(),
        }
    }
}
