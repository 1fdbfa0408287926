//! HTTP object store
//!
//! Objects are addressed as `{base_url}/{key}`: HEAD checks existence, GET
//! reads, PUT overwrites. ureq is blocking, so every call runs inside
//! `spawn_blocking`.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;
use ureq::Agent;

use super::ObjectStore;
use crate::errors::{Result, UtmLoggerError};

pub struct HttpObjectStore {
    base_url: String,
    token: Option<String>,
    agent: Agent,
}

impl HttpObjectStore {
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| {
            UtmLoggerError::validation(format!("Invalid blob base_url '{}': {}", base_url, e))
        })?;

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .build()
            .into();

        Ok(Self {
            base_url,
            token: token.filter(|t| !t.is_empty()),
            agent,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }

    fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    async fn run_blocking<T, F>(op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        tokio::task::spawn_blocking(f).await.map_err(|e| {
            UtmLoggerError::blob_store(format!("Blob {} task failed: {}", op, e))
        })?
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        let agent = self.agent.clone();
        let url = self.object_url(key);
        let bearer = self.bearer();

        Self::run_blocking("HEAD", move || {
            let mut request = agent.head(&url);
            if let Some(bearer) = bearer {
                request = request.header("Authorization", bearer);
            }
            match request.call() {
                Ok(_) => Ok(true),
                Err(ureq::Error::StatusCode(404)) => Ok(false),
                Err(e) => Err(UtmLoggerError::blob_store(format!(
                    "HEAD {} failed: {}",
                    url, e
                ))),
            }
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let agent = self.agent.clone();
        let url = self.object_url(key);
        let bearer = self.bearer();

        Self::run_blocking("GET", move || {
            let mut request = agent.get(&url);
            if let Some(bearer) = bearer {
                request = request.header("Authorization", bearer);
            }
            match request.call() {
                Ok(response) => {
                    let body = response.into_body().read_to_string().map_err(|e| {
                        UtmLoggerError::blob_store(format!("Reading {} failed: {}", url, e))
                    })?;
                    trace!("Fetched {} bytes from {}", body.len(), url);
                    Ok(Some(body))
                }
                Err(ureq::Error::StatusCode(404)) => Ok(None),
                Err(e) => Err(UtmLoggerError::blob_store(format!(
                    "GET {} failed: {}",
                    url, e
                ))),
            }
        })
        .await
    }

    async fn put(&self, key: &str, body: String, content_type: &str) -> Result<()> {
        let agent = self.agent.clone();
        let url = self.object_url(key);
        let bearer = self.bearer();
        let content_type = content_type.to_string();

        Self::run_blocking("PUT", move || {
            let mut request = agent.put(&url).header("Content-Type", content_type);
            if let Some(bearer) = bearer {
                request = request.header("Authorization", bearer);
            }
            request.send(body).map_err(|e| {
                UtmLoggerError::blob_store(format!("PUT {} failed: {}", url, e))
            })?;
            Ok(())
        })
        .await
    }

    fn public_url(&self, key: &str) -> String {
        self.object_url(key)
    }

    fn provider_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_joins_cleanly() {
        let store = HttpObjectStore::new("https://blob.example.com/bucket/", None, 5).unwrap();
        assert_eq!(
            store.public_url("/utm-logs.json"),
            "https://blob.example.com/bucket/utm-logs.json"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpObjectStore::new("not a url", None, 5).is_err());
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let store =
            HttpObjectStore::new("https://blob.example.com", Some(String::new()), 5).unwrap();
        assert!(store.bearer().is_none());

        let store =
            HttpObjectStore::new("https://blob.example.com", Some("s3cr3t".into()), 5).unwrap();
        assert_eq!(store.bearer().as_deref(), Some("Bearer s3cr3t"));
    }
}
