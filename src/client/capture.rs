//! Landing-page capture hook
//!
//! Reads the UTM keys off a page URL, reports the campaign, forwards it to
//! the ingestion endpoint and keeps a small local mirror.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use super::kv::{KeyValueStore, UTM_LOGS_KEY, UTM_PARAMS_KEY, read_json, write_json};
use super::transport::LogTransport;
use crate::storage::{IngestRequest, UTM_KEYS, UtmLog, UtmParams, prepend_capped};

/// Size of the local `utm_logs` mirror
pub const MIRROR_CAP: usize = 100;

/// Analytics event name reported for every non-empty capture
pub const CAPTURE_EVENT: &str = "utm_campaign_detected";

/// Pull the recognised UTM keys out of a page URL
///
/// Values are percent-decoded; empty values are ignored and the first
/// occurrence of a repeated key wins. Accepts a bare query string too.
pub fn extract_utm_params(page_url: &str) -> UtmParams {
    let mut params = UtmParams::default();

    let pairs: Vec<(String, String)> = match url::Url::parse(page_url) {
        Ok(parsed) => parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        Err(_) => {
            let query = page_url
                .split_once('?')
                .map(|(_, q)| q)
                .unwrap_or(page_url);
            let query = query.split('#').next().unwrap_or_default();
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        }
    };

    for (key, value) in pairs {
        if value.is_empty() || !UTM_KEYS.contains(&key.as_str()) {
            continue;
        }
        if params.get(&key).is_none() {
            params.set(&key, value);
        }
    }

    params
}

/// Sink for the `utm_campaign_detected` event
pub trait AnalyticsReporter: Send + Sync {
    fn report(&self, event: &str, params: &UtmParams);
}

/// Emits the analytics event as a structured log line
pub struct TracingAnalytics;

impl AnalyticsReporter for TracingAnalytics {
    fn report(&self, event: &str, params: &UtmParams) {
        info!(
            event = event,
            source = params.utm_source.as_deref().unwrap_or_default(),
            medium = params.utm_medium.as_deref().unwrap_or_default(),
            campaign = params.utm_campaign.as_deref().unwrap_or_default(),
            "analytics event"
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// This instance already captured once
    AlreadyRan,
    /// No UTM keys on the page
    NoParams,
    Sent(UtmParams),
    /// The POST failed; local mirroring still happened
    SendFailed(UtmParams),
}

pub struct UtmCapture {
    transport: Arc<dyn LogTransport>,
    store: Option<Arc<dyn KeyValueStore>>,
    analytics: Option<Arc<dyn AnalyticsReporter>>,
    user_agent: Option<String>,
    mirror_locally: bool,
    ran: AtomicBool,
}

impl UtmCapture {
    pub fn new(transport: Arc<dyn LogTransport>) -> Self {
        Self {
            transport,
            store: None,
            analytics: None,
            user_agent: None,
            mirror_locally: true,
            ran: AtomicBool::new(false),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_analytics(mut self, analytics: Arc<dyn AnalyticsReporter>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    /// Client identity written into mirrored records
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn mirror_locally(mut self, enabled: bool) -> Self {
        self.mirror_locally = enabled;
        self
    }

    /// Capture `page_url`; only the first call on an instance does anything
    pub async fn capture(&self, page_url: &str) -> CaptureOutcome {
        if self.ran.swap(true, Ordering::SeqCst) {
            debug!("UTM capture already ran, skipping");
            return CaptureOutcome::AlreadyRan;
        }

        let params = extract_utm_params(page_url);
        if params.is_empty() {
            debug!("No UTM parameters on {}", page_url);
            return CaptureOutcome::NoParams;
        }

        if let Some(analytics) = &self.analytics {
            analytics.report(CAPTURE_EVENT, &params);
        }

        let request = IngestRequest {
            params: params.clone(),
            url: page_url.to_string(),
        };
        let sent = match self.transport.send_log(&request).await {
            Ok(()) => true,
            Err(e) => {
                // 只记录，不重试
                error!("Error sending UTM log: {}", e);
                false
            }
        };

        if self.mirror_locally
            && let Some(store) = &self.store
        {
            self.mirror(store.as_ref(), &params, page_url);
        }

        if sent {
            CaptureOutcome::Sent(params)
        } else {
            CaptureOutcome::SendFailed(params)
        }
    }

    fn mirror(&self, store: &dyn KeyValueStore, params: &UtmParams, page_url: &str) {
        let mut logs: Vec<UtmLog> = read_json(store, UTM_LOGS_KEY).unwrap_or_default();
        let entry = UtmLog::new(params.clone(), page_url, self.user_agent.as_deref());
        prepend_capped(&mut logs, entry, MIRROR_CAP);

        if let Err(e) = write_json(store, UTM_LOGS_KEY, &logs) {
            warn!("Failed to mirror UTM log locally: {}", e);
        }
        if let Err(e) = write_json(store, UTM_PARAMS_KEY, params) {
            warn!("Failed to cache UTM params locally: {}", e);
        }
    }
}

/// Latest cached mapping; empty without a store or when nothing is cached
pub fn get_utm_params(store: Option<&dyn KeyValueStore>) -> UtmParams {
    store
        .and_then(|s| read_json(s, UTM_PARAMS_KEY))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_decodes_and_filters() {
        let params = extract_utm_params(
            "https://x.com/landing?utm_source=news%20letter&utm_medium=&ref=abc&utm_campaign=spring+sale",
        );
        assert_eq!(params.utm_source.as_deref(), Some("news letter"));
        assert!(params.utm_medium.is_none());
        assert_eq!(params.utm_campaign.as_deref(), Some("spring sale"));
        assert_eq!(params.iter().count(), 2);
    }

    #[test]
    fn test_extract_first_occurrence_wins() {
        let params = extract_utm_params("https://x.com/?utm_source=a&utm_source=b");
        assert_eq!(params.utm_source.as_deref(), Some("a"));
    }

    #[test]
    fn test_extract_bare_query() {
        let params = extract_utm_params("?utm_term=shoes#top");
        assert_eq!(params.utm_term.as_deref(), Some("shoes"));
    }

    #[test]
    fn test_extract_without_query_is_empty() {
        assert!(extract_utm_params("https://x.com/landing").is_empty());
    }

    #[test]
    fn test_get_utm_params_without_store() {
        assert!(get_utm_params(None).is_empty());
    }
}
