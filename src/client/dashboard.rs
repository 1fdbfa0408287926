//! Terminal dashboard over the retrieval endpoint

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::kv::{KeyValueStore, UTM_LOGS_KEY, read_json};
use super::transport::LogTransport;
use crate::errors::Result;
use crate::storage::UtmLog;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Where the displayed collection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogsOrigin {
    Server,
    LocalMirror,
}

pub struct Dashboard {
    transport: Arc<dyn LogTransport>,
    store: Option<Arc<dyn KeyValueStore>>,
    logs: Vec<UtmLog>,
    origin: LogsOrigin,
    filter: String,
}

impl Dashboard {
    pub fn new(transport: Arc<dyn LogTransport>) -> Self {
        Self {
            transport,
            store: None,
            logs: Vec::new(),
            origin: LogsOrigin::Server,
            filter: String::new(),
        }
    }

    /// Local mirror used as fallback and by [`Dashboard::clear`]
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn logs(&self) -> &[UtmLog] {
        &self.logs
    }

    pub fn origin(&self) -> LogsOrigin {
        self.origin
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    /// Reload from the server, falling back to the local mirror when the
    /// response is not an array of records or the request fails
    pub async fn refresh(&mut self) -> LogsOrigin {
        match self.transport.fetch_logs().await {
            Ok(value) if value.is_array() => match serde_json::from_value::<Vec<UtmLog>>(value) {
                Ok(logs) => {
                    debug!("Dashboard loaded {} logs from server", logs.len());
                    self.logs = logs;
                    self.origin = LogsOrigin::Server;
                    return self.origin;
                }
                Err(e) => warn!("Server returned unreadable records: {}", e),
            },
            Ok(value) => warn!("Server returned a non-array response: {}", value),
            Err(e) => warn!("Error fetching UTM logs: {}", e),
        }

        self.logs = self.local_mirror();
        self.origin = LogsOrigin::LocalMirror;
        self.origin
    }

    fn local_mirror(&self) -> Vec<UtmLog> {
        self.store
            .as_deref()
            .and_then(|s| read_json(s, UTM_LOGS_KEY))
            .unwrap_or_default()
    }

    /// Refresh now and then every `interval` until `shutdown` flips to true
    ///
    /// A zero interval falls back to [`DEFAULT_REFRESH_INTERVAL`]; a slow
    /// fetch delays the next tick instead of triggering catch-up refreshes.
    pub async fn run<F>(
        &mut self,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
        mut on_refresh: F,
    ) where
        F: FnMut(&Dashboard),
    {
        let interval = if interval.is_zero() {
            warn!("Zero refresh interval, using {:?}", DEFAULT_REFRESH_INTERVAL);
            DEFAULT_REFRESH_INTERVAL
        } else {
            interval
        };
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                    on_refresh(self);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("Dashboard polling stopped");
                        break;
                    }
                }
            }
        }
    }

    /// Case-insensitive OR over source, medium, campaign and url
    pub fn matches_filter(log: &UtmLog, filter: &str) -> bool {
        if filter.is_empty() {
            return true;
        }
        let needle = filter.to_lowercase();
        [
            log.params.utm_source.as_deref(),
            log.params.utm_medium.as_deref(),
            log.params.utm_campaign.as_deref(),
            Some(log.url.as_str()),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn filtered(&self) -> Vec<&UtmLog> {
        self.logs
            .iter()
            .filter(|log| Self::matches_filter(log, &self.filter))
            .collect()
    }

    /// Pretty JSON of the full, unfiltered collection
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.logs)?)
    }

    pub fn export_file_name(now: DateTime<Utc>) -> String {
        format!(
            "utm-logs-{}.json",
            now.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }

    /// Write the export into `dir`, returning the created path
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(Self::export_file_name(Utc::now()));
        std::fs::write(&path, self.export_json()?)?;
        info!("Exported {} logs to {}", self.logs.len(), path.display());
        Ok(path)
    }

    /// Erase the local mirror and the displayed list; the server is untouched
    pub fn clear(&mut self, confirm: bool) -> Result<bool> {
        if !confirm {
            return Ok(false);
        }
        if let Some(store) = &self.store {
            store.remove(UTM_LOGS_KEY)?;
        }
        self.logs.clear();
        Ok(true)
    }

    pub fn render(&self) -> String {
        let entries = self.filtered();
        if entries.is_empty() {
            return "No UTM logs found".to_string();
        }

        let mut out = String::new();
        for (i, log) in entries.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = writeln!(
                out,
                "TIMESTAMP:  {}",
                log.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
            );
            let fields = [
                ("SOURCE", log.params.utm_source.as_deref()),
                ("MEDIUM", log.params.utm_medium.as_deref()),
                ("CAMPAIGN", log.params.utm_campaign.as_deref()),
                ("CONTENT", log.params.utm_content.as_deref()),
                ("TERM", log.params.utm_term.as_deref()),
            ];
            for (label, value) in fields {
                if let Some(value) = value {
                    let _ = writeln!(out, "{:<11} {}", format!("{}:", label), value);
                }
            }
            let _ = writeln!(out, "URL:        {}", log.url);
            let _ = writeln!(out, "USER-AGENT: {}", log.user_agent);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::UtmParams;
    use chrono::TimeZone;

    fn sample(source: &str, url: &str) -> UtmLog {
        let params = UtmParams {
            utm_source: Some(source.to_string()),
            ..Default::default()
        };
        UtmLog::new(params, url, Some("TestAgent/1.0"))
    }

    #[test]
    fn test_filter_is_case_insensitive_or() {
        let log = sample("Google", "https://x.com/landing");
        assert!(Dashboard::matches_filter(&log, "goo"));
        assert!(Dashboard::matches_filter(&log, "LANDING"));
        assert!(Dashboard::matches_filter(&log, ""));
        assert!(!Dashboard::matches_filter(&log, "bing"));
    }

    #[test]
    fn test_export_file_name() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            Dashboard::export_file_name(now),
            "utm-logs-2025-03-01T12:30:00.000Z.json"
        );
    }
}
