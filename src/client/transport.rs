//! Transport between the client components and the HTTP endpoints

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};
use ureq::Agent;

use crate::errors::{Result, UtmLoggerError};
use crate::storage::IngestRequest;

/// Path of the ingestion / retrieval endpoint
pub const UTM_LOGS_PATH: &str = "/api/utm-logs";

/// HTTP 请求超时时间
const HTTP_TIMEOUT_SECS: u64 = 10;

/// 全局 HTTP Agent（ureq 的 Agent 是 Send + Sync）
static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

fn get_agent() -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(HTTP_TIMEOUT_SECS)))
            .build()
            .into()
    })
}

#[async_trait]
pub trait LogTransport: Send + Sync {
    /// POST one capture to the ingestion endpoint
    async fn send_log(&self, request: &IngestRequest) -> Result<()>;

    /// GET the retrieval endpoint; the body is returned as raw JSON so the
    /// caller can decide what to do with non-array responses
    async fn fetch_logs(&self) -> Result<serde_json::Value>;
}

/// ureq-based transport talking to a running server
pub struct HttpTransport {
    endpoint: String,
    user_agent: Option<String>,
}

impl HttpTransport {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:8080`
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), UTM_LOGS_PATH),
            user_agent: None,
        }
    }

    /// Send this `User-Agent` with every request
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LogTransport for HttpTransport {
    async fn send_log(&self, request: &IngestRequest) -> Result<()> {
        let endpoint = self.endpoint.clone();
        let user_agent = self.user_agent.clone();
        let body = request.clone();

        tokio::task::spawn_blocking(move || {
            let mut req = get_agent().post(&endpoint);
            if let Some(ua) = user_agent {
                req = req.header("User-Agent", ua);
            }
            req.send_json(&body).map_err(|e| {
                UtmLoggerError::transport(format!("POST {} failed: {}", endpoint, e))
            })?;
            debug!("UTM log delivered to {}", endpoint);
            Ok(())
        })
        .await
        .map_err(|e| UtmLoggerError::transport(format!("send task failed: {}", e)))?
    }

    async fn fetch_logs(&self) -> Result<serde_json::Value> {
        let endpoint = self.endpoint.clone();
        let user_agent = self.user_agent.clone();

        tokio::task::spawn_blocking(move || {
            let mut req = get_agent().get(&endpoint);
            if let Some(ua) = user_agent {
                req = req.header("User-Agent", ua);
            }
            let response = req.call().map_err(|e| {
                UtmLoggerError::transport(format!("GET {} failed: {}", endpoint, e))
            })?;
            let value: serde_json::Value = response.into_body().read_json().map_err(|e| {
                UtmLoggerError::transport(format!("Invalid JSON from {}: {}", endpoint, e))
            })?;
            trace!("Fetched logs from {}", endpoint);
            Ok(value)
        })
        .await
        .map_err(|e| UtmLoggerError::transport(format!("fetch task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_base_url() {
        assert_eq!(
            HttpTransport::new("http://127.0.0.1:8080/").endpoint(),
            "http://127.0.0.1:8080/api/utm-logs"
        );
    }
}
