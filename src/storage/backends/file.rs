use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::config::{BackendKind, FileStorageConfig};
use crate::errors::{Result, UtmLoggerError};
use crate::storage::retention::prepend_capped;
use crate::storage::{StorageConfig, UtmLog, UtmLogStore};

/// Whole collection stored as one pretty-printed JSON array
///
/// A single record that fails to parse makes the whole document unreadable
/// and every later append fails; the file is never overwritten. Move it
/// aside (or fix the record) to start a fresh log.
///
/// `append` rewrites the entire document. The write lock only serialises
/// writers inside this process; a second process writing the same file can
/// still lose updates (last writer wins).
pub struct FileStorage {
    path: PathBuf,
    retention_cap: usize,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>, retention_cap: usize) -> Self {
        FileStorage {
            path: path.into(),
            retention_cap,
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &FileStorageConfig) -> Self {
        Self::new(&config.path, config.retention_cap)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Vec<UtmLog>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Log file {} not found, treating as empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(UtmLoggerError::file_operation(format!(
                    "Failed to read log file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str::<Vec<UtmLog>>(&content).map_err(|e| {
            error!(
                "Failed to parse log file {}: {}. Appends are refused until the file is \
                 repaired or moved aside (e.g. `mv {} {}.bak`)",
                self.path.display(),
                e,
                self.path.display(),
                self.path.display()
            );
            UtmLoggerError::serialization(format!(
                "Failed to parse log file {}: {}; move it aside to start a new log",
                self.path.display(),
                e
            ))
        })
    }

    async fn write_document(&self, logs: &[UtmLog]) -> Result<()> {
        let json = serde_json::to_string_pretty(logs)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, json).await.map_err(|e| {
            UtmLoggerError::file_operation(format!(
                "Failed to write log file {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

#[async_trait]
impl UtmLogStore for FileStorage {
    async fn try_load(&self) -> Result<Vec<UtmLog>> {
        self.read_document().await
    }

    async fn append(&self, log: UtmLog) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        // 读取失败时不能覆盖原文件，否则会清空已有记录
        let mut logs = self.read_document().await?;
        let dropped = prepend_capped(&mut logs, log, self.retention_cap);
        self.write_document(&logs).await?;

        if dropped > 0 {
            debug!("Retention cap reached, dropped {} oldest log(s)", dropped);
        }
        info!("Saved UTM log to {} ({} entries)", self.path.display(), logs.len());
        Ok(())
    }

    fn backend_config(&self) -> StorageConfig {
        StorageConfig {
            backend: BackendKind::File,
            retention_cap: Some(self.retention_cap),
            read_limit: None,
            location: self.path.display().to_string(),
        }
    }
}
