use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::init_db::InitDbService;
use super::types::{ApiError, IngestResponse};
use crate::storage::{IngestRequest, UtmLog, UtmLogStore};

/// Ingestion and retrieval handlers
pub struct UtmLogService;

impl UtmLogService {
    /// `POST /api/utm-logs`
    ///
    /// The body is parsed by hand so that malformed JSON gets the same
    /// `{error, details}` shape as storage failures.
    pub async fn post_log(
        req: HttpRequest,
        body: web::Bytes,
        storage: web::Data<Arc<dyn UtmLogStore>>,
    ) -> impl Responder {
        let payload: IngestRequest = match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Rejected malformed UTM log body: {}", e);
                return error_response("Failed to save log", e.to_string());
            }
        };

        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|h| h.to_str().ok());

        let log = UtmLog::new(payload.params, payload.url, user_agent);
        debug!(
            "Received UTM log: source={:?} medium={:?} campaign={:?}",
            log.params.utm_source, log.params.utm_medium, log.params.utm_campaign
        );

        match storage.append(log.clone()).await {
            Ok(()) => HttpResponse::Ok().json(IngestResponse { success: true, log }),
            Err(e) => {
                error!("Error saving UTM log: {}", e);
                error_response("Failed to save log", e.message())
            }
        }
    }

    /// `GET /api/utm-logs`: newest-first array, `[]` for an empty store
    pub async fn get_logs(storage: web::Data<Arc<dyn UtmLogStore>>) -> impl Responder {
        match storage.try_load().await {
            Ok(logs) => HttpResponse::Ok().json(logs),
            Err(e) => {
                error!("Error reading UTM logs: {}", e);
                error_response("Failed to get logs", e.message())
            }
        }
    }
}

pub(crate) fn error_response(error: &str, details: impl Into<String>) -> HttpResponse {
    HttpResponse::build(StatusCode::INTERNAL_SERVER_ERROR).json(ApiError {
        error: error.to_string(),
        details: details.into(),
    })
}

/// `/api` 路由配置
///
/// `/init-db` only exists for the relational backend.
pub fn api_routes(with_init_db: bool) -> actix_web::Scope {
    let scope = web::scope("/api")
        .route("/utm-logs", web::get().to(UtmLogService::get_logs))
        .route("/utm-logs", web::post().to(UtmLogService::post_log));

    if with_init_db {
        scope.route("/init-db", web::get().to(InitDbService::init_db))
    } else {
        scope
    }
}
