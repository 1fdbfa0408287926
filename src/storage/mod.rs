use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use crate::config::{BackendKind, StorageSettings};
use crate::errors::Result;

pub mod backends;
pub mod models;
pub mod retention;

pub use backends::blob::{BlobStorage, HttpObjectStore, MemoryObjectStore, ObjectStore, RedisObjectStore};
pub use backends::file::FileStorage;
pub use backends::relational::RelationalStorage;
pub use models::{IngestRequest, StorageConfig, UNKNOWN_USER_AGENT, UTM_KEYS, UtmLog, UtmParams};
pub use retention::prepend_capped;

/// Persistence contract shared by every backend
///
/// The persisted collection is newest-first by insertion.
#[async_trait]
pub trait UtmLogStore: Send + Sync {
    /// Full ordered collection; a store that does not exist yet is empty
    async fn try_load(&self) -> Result<Vec<UtmLog>>;

    /// Like [`try_load`](Self::try_load), but read failures are logged and
    /// degrade to an empty collection
    async fn load(&self) -> Vec<UtmLog> {
        match self.try_load().await {
            Ok(logs) => logs,
            Err(e) => {
                error!(
                    "Failed to load UTM logs from {} storage: {}",
                    self.backend_config().backend,
                    e
                );
                Vec::new()
            }
        }
    }

    /// Durably add one record; failures are returned to the caller
    async fn append(&self, log: UtmLog) -> Result<()>;

    /// Prepare the backing store (create tables etc.)
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn backend_config(&self) -> StorageConfig;
}

pub struct StorageFactory;

impl StorageFactory {
    /// Build the backend selected in the global configuration
    pub async fn create() -> Result<Arc<dyn UtmLogStore>> {
        let config = crate::config::get_config();
        Self::create_with(&config.storage).await
    }

    pub async fn create_with(settings: &StorageSettings) -> Result<Arc<dyn UtmLogStore>> {
        let storage: Arc<dyn UtmLogStore> = match settings.backend {
            BackendKind::File => Arc::new(FileStorage::from_config(&settings.file)),
            BackendKind::Blob => Arc::new(BlobStorage::from_config(&settings.blob).await?),
            BackendKind::Relational => {
                Arc::new(RelationalStorage::from_config(&settings.relational).await?)
            }
        };

        let backend = storage.backend_config();
        warn!(
            "{} storage initialized at {}",
            backend.backend.as_ref().to_uppercase(),
            backend.location
        );
        Ok(storage)
    }
}
