//! API 响应类型

use serde::{Deserialize, Serialize};

use crate::storage::UtmLog;

/// Failure body shared by every endpoint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
    pub error: String,
    pub details: String,
}

/// `POST /api/utm-logs` success body
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct IngestResponse {
    pub success: bool,
    pub log: UtmLog,
}

/// `GET /api/init-db` success body
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct InitDbResponse {
    pub success: bool,
    pub message: String,
}
