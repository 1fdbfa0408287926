use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::BackendKind;

/// User-Agent placeholder when the request carries none
pub const UNKNOWN_USER_AGENT: &str = "Unknown";

/// The five recognised campaign keys, in display order
pub const UTM_KEYS: [&str; 5] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
];

/// Partial mapping of UTM parameters; only keys that were present are `Some`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
}

impl UtmParams {
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "utm_source" => self.utm_source.as_deref(),
            "utm_medium" => self.utm_medium.as_deref(),
            "utm_campaign" => self.utm_campaign.as_deref(),
            "utm_content" => self.utm_content.as_deref(),
            "utm_term" => self.utm_term.as_deref(),
            _ => None,
        }
    }

    /// Set a recognised key; returns `false` for anything else
    pub fn set(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "utm_source" => &mut self.utm_source,
            "utm_medium" => &mut self.utm_medium,
            "utm_campaign" => &mut self.utm_campaign,
            "utm_content" => &mut self.utm_content,
            "utm_term" => &mut self.utm_term,
            _ => return false,
        };
        *slot = Some(value);
        true
    }

    /// Present `(key, value)` pairs in [`UTM_KEYS`] order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        UTM_KEYS
            .iter()
            .filter_map(move |key| self.get(key).map(|v| (*key, v)))
    }
}

/// One captured visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmLog {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub params: UtmParams,
    pub url: String,
    // 旧版文件使用 userAgent 字段名
    #[serde(alias = "userAgent", default = "unknown_user_agent")]
    pub user_agent: String,
}

fn unknown_user_agent() -> String {
    UNKNOWN_USER_AGENT.to_string()
}

impl UtmLog {
    /// Build a record stamped with the current time
    pub fn new(params: UtmParams, url: impl Into<String>, user_agent: Option<&str>) -> Self {
        Self::with_timestamp(Utc::now(), params, url, user_agent)
    }

    pub fn with_timestamp(
        timestamp: DateTime<Utc>,
        params: UtmParams,
        url: impl Into<String>,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            timestamp,
            params,
            url: url.into(),
            user_agent: user_agent
                .filter(|ua| !ua.is_empty())
                .map(str::to_string)
                .unwrap_or_else(unknown_user_agent),
        }
    }
}

/// Body accepted by `POST /api/utm-logs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(flatten)]
    pub params: UtmParams,
    pub url: String,
}

/// Storage backend description (for logs and CLI output)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Write-side cap; `None` when the backend never truncates on write
    pub retention_cap: Option<usize>,
    /// Read-side limit; `None` when reads return the whole collection
    pub read_limit: Option<u64>,
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_params_are_omitted() {
        let params = UtmParams {
            utm_source: Some("google".into()),
            ..Default::default()
        };
        let log = UtmLog::new(params, "https://x.com/landing", Some("TestAgent/1.0"));

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json["utm_source"], "google");
        assert!(json.get("utm_campaign").is_none());
        assert_eq!(json["user_agent"], "TestAgent/1.0");
    }

    #[test]
    fn test_missing_user_agent_defaults_to_unknown() {
        let log = UtmLog::new(UtmParams::default(), "https://x.com", None);
        assert_eq!(log.user_agent, UNKNOWN_USER_AGENT);

        let log = UtmLog::new(UtmParams::default(), "https://x.com", Some(""));
        assert_eq!(log.user_agent, UNKNOWN_USER_AGENT);
    }

    #[test]
    fn test_reads_legacy_user_agent_key() {
        let json = r#"{
            "timestamp": "2024-05-01T10:00:00.000Z",
            "utm_source": "newsletter",
            "url": "https://example.com/?utm_source=newsletter",
            "userAgent": "Mozilla/5.0"
        }"#;
        let log: UtmLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.user_agent, "Mozilla/5.0");
        assert_eq!(log.params.utm_source.as_deref(), Some("newsletter"));
    }

    #[test]
    fn test_ingest_request_requires_url() {
        let err = serde_json::from_str::<IngestRequest>(r#"{"utm_source":"x"}"#);
        assert!(err.is_err());

        let ok: IngestRequest =
            serde_json::from_str(r#"{"utm_medium":"cpc","url":"https://a.b"}"#).unwrap();
        assert_eq!(ok.params.utm_medium.as_deref(), Some("cpc"));
    }

    #[test]
    fn test_params_iter_in_key_order() {
        let mut params = UtmParams::default();
        assert!(params.is_empty());
        assert!(params.set("utm_term", "shoes".into()));
        assert!(params.set("utm_source", "bing".into()));
        assert!(!params.set("utm_unknown", "x".into()));

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("utm_source", "bing"), ("utm_term", "shoes")]);
    }
}
