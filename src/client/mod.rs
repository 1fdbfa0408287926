//! Client-side components: the landing-page capture hook and the dashboard
//!
//! Both talk to the server through [`LogTransport`] and keep their local
//! state in an injected [`KeyValueStore`].

pub mod capture;
pub mod dashboard;
pub mod kv;
pub mod transport;

pub use capture::{
    AnalyticsReporter, CAPTURE_EVENT, CaptureOutcome, MIRROR_CAP, TracingAnalytics, UtmCapture,
    extract_utm_params, get_utm_params,
};
pub use dashboard::{DEFAULT_REFRESH_INTERVAL, Dashboard, LogsOrigin};
pub use kv::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, UTM_LOGS_KEY, UTM_PARAMS_KEY,
};
pub use transport::{HttpTransport, LogTransport, UTM_LOGS_PATH};
