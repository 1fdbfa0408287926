//! Relational storage backend (SeaORM)
//!
//! One row per record in `utm_logs`. Appends are single INSERTs and the
//! table is never truncated; reads return the newest `read_limit` rows.

mod connection;
mod converters;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder, QuerySelect};
use tracing::{debug, info};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_utm_log, utm_log_to_active_model};

use crate::config::{BackendKind, RelationalStorageConfig};
use crate::errors::{Result, UtmLoggerError};
use crate::storage::{StorageConfig, UtmLog, UtmLogStore};

use migration::entities::utm_log;

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(UtmLoggerError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

#[derive(Clone)]
pub struct RelationalStorage {
    db: DatabaseConnection,
    backend_name: String,
    read_limit: u64,
}

impl RelationalStorage {
    /// Connect; the table is created only when `auto_migrate` is set
    pub async fn new(
        database_url: &str,
        pool_size: u32,
        read_limit: u64,
        auto_migrate: bool,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(UtmLoggerError::database_config(
                "storage.relational.database_url 未设置",
            ));
        }

        let backend_name = infer_backend_from_url(database_url)?;
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, &backend_name, pool_size).await?
        };

        let storage = RelationalStorage {
            db,
            backend_name,
            read_limit: read_limit.max(1),
        };

        if auto_migrate {
            run_migrations(&storage.db).await?;
        } else {
            debug!("auto_migrate disabled, call GET /api/init-db to create utm_logs");
        }

        Ok(storage)
    }

    pub async fn from_config(config: &RelationalStorageConfig) -> Result<Self> {
        Self::new(
            &config.database_url,
            config.pool_size,
            config.read_limit,
            config.auto_migrate,
        )
        .await
    }
}

#[async_trait]
impl UtmLogStore for RelationalStorage {
    async fn try_load(&self) -> Result<Vec<UtmLog>> {
        let models = utm_log::Entity::find()
            .order_by_desc(utm_log::Column::CreatedAt)
            .order_by_desc(utm_log::Column::Id)
            .limit(self.read_limit)
            .all(&self.db)
            .await
            .map_err(|e| UtmLoggerError::database_operation(format!("查询 UTM 日志失败: {}", e)))?;

        debug!("Loaded {} UTM logs from {}", models.len(), self.backend_name);
        Ok(models.into_iter().map(model_to_utm_log).collect())
    }

    async fn append(&self, log: UtmLog) -> Result<()> {
        utm_log::Entity::insert(utm_log_to_active_model(&log))
            .exec(&self.db)
            .await
            .map_err(|e| UtmLoggerError::database_operation(format!("写入 UTM 日志失败: {}", e)))?;

        info!("Inserted UTM log for {}", log.url);
        Ok(())
    }

    async fn initialize(&self) -> Result<()> {
        run_migrations(&self.db).await
    }

    fn backend_config(&self) -> StorageConfig {
        StorageConfig {
            backend: BackendKind::Relational,
            retention_cap: None,
            read_limit: Some(self.read_limit),
            location: self.backend_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_sqlite() {
        assert_eq!(infer_backend_from_url("sqlite://utm.db?mode=rwc").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("sqlite::memory:").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("data/utm.sqlite").unwrap(), "sqlite");
    }

    #[test]
    fn test_infer_server_databases() {
        assert_eq!(
            infer_backend_from_url("mariadb://u:p@localhost/utm").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgresql://u:p@localhost/utm").unwrap(),
            "postgres"
        );
    }

    #[test]
    fn test_infer_unknown_scheme_fails() {
        assert!(infer_backend_from_url("mongodb://localhost/utm").is_err());
    }
}
