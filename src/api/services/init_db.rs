use actix_web::{HttpResponse, Responder, web};
use std::sync::Arc;
use tracing::{error, info};

use super::types::InitDbResponse;
use super::utm_logs::error_response;
use crate::storage::UtmLogStore;

pub struct InitDbService;

impl InitDbService {
    /// 创建 utm_logs 表（仅关系型后端注册此路由）
    pub async fn init_db(storage: web::Data<Arc<dyn UtmLogStore>>) -> impl Responder {
        match storage.initialize().await {
            Ok(()) => {
                info!("Database initialized via /api/init-db");
                HttpResponse::Ok().json(InitDbResponse {
                    success: true,
                    message: "Database initialized successfully".to_string(),
                })
            }
            Err(e) => {
                error!("Error initializing database: {}", e);
                error_response("Failed to initialize database", e.message())
            }
        }
    }
}
