use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::{BackendKind, get_config};
use crate::storage::{StorageFactory, UtmLogStore};

pub struct StartupContext {
    pub storage: Arc<dyn UtmLogStore>,
    /// `GET /api/init-db` is only mounted for the relational backend
    pub enable_init_db: bool,
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();
    let storage = StorageFactory::create_with(&config.storage)
        .await
        .context("Failed to create storage backend")?;

    let backend = storage.backend_config();
    info!(
        "Using storage backend: {} ({})",
        backend.backend, backend.location
    );

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        enable_init_db: backend.backend == BackendKind::Relational,
    })
}
