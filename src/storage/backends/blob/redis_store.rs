use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;
use tracing::debug;

use super::ObjectStore;
use crate::errors::{Result, UtmLoggerError};

/// Redis-backed object store: one string value per key
///
/// Redis has no content-type metadata, so the `content_type` argument of
/// `put` is not persisted.
pub struct RedisObjectStore {
    client: redis::Client,
    url: String,
    connection: OnceCell<ConnectionManager>,
}

impl RedisObjectStore {
    pub fn new(url: &str) -> Result<Self> {
        let display_url = redact_credentials(url)?;
        let client = redis::Client::open(url).map_err(|e| {
            UtmLoggerError::blob_store(format!("Invalid Redis URL '{}': {}", display_url, e))
        })?;

        Ok(Self {
            client,
            url: display_url,
            connection: OnceCell::new(),
        })
    }

    /// 懒加载连接，首次访问时建立
    async fn connection(&self) -> Result<ConnectionManager> {
        let conn = self
            .connection
            .get_or_try_init(|| async {
                let conn = self.client.get_connection_manager().await?;
                debug!("Redis connection established: {}", self.url);
                Ok::<_, redis::RedisError>(conn)
            })
            .await?;
        Ok(conn.clone())
    }
}

/// Connection URL without userinfo, safe to log
fn redact_credentials(url: &str) -> Result<String> {
    let mut parsed = url::Url::parse(url)
        .map_err(|e| UtmLoggerError::blob_store(format!("Invalid Redis URL: {}", e)))?;
    // cannot-be-a-base URLs have no userinfo to strip
    let _ = parsed.set_password(None);
    let _ = parsed.set_username("");
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[async_trait]
impl ObjectStore for RedisObjectStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let body: Option<String> = conn.get(key).await?;
        Ok(body)
    }

    async fn put(&self, key: &str, body: String, _content_type: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.set(key, body).await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.url, key)
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_hides_password() {
        let store = RedisObjectStore::new("redis://:hunter2@cache.internal:6379/").unwrap();
        let location = store.public_url("utm-logs.json");
        assert!(!location.contains("hunter2"));
        assert_eq!(location, "redis://cache.internal:6379/utm-logs.json");
    }

    #[test]
    fn test_public_url_hides_username() {
        let store = RedisObjectStore::new("redis://admin:pw@localhost:6379/0").unwrap();
        let location = store.public_url("k");
        assert!(!location.contains("admin"));
        assert!(!location.contains("pw@"));
        assert_eq!(location, "redis://localhost:6379/0/k");
    }

    #[test]
    fn test_invalid_url_is_blob_error() {
        assert!(matches!(
            RedisObjectStore::new("not a url"),
            Err(UtmLoggerError::BlobStore(_))
        ));
    }
}
