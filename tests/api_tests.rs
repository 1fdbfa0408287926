//! HTTP 端点集成测试

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::{Value, json};
use tempfile::TempDir;

use utmlogger::api::middleware::RequestSpan;
use utmlogger::api::services::api_routes;
use utmlogger::storage::{FileStorage, RelationalStorage, UtmLogStore};

fn file_store(dir: &TempDir, cap: usize) -> Arc<dyn UtmLogStore> {
    Arc::new(FileStorage::new(dir.path().join("utm-logs.json"), cap))
}

macro_rules! app {
    ($storage:expr, $init_db:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestSpan)
                .app_data(web::Data::new($storage))
                .service(api_routes($init_db)),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_post_then_get_example() {
    let dir = TempDir::new().unwrap();
    let app = app!(file_store(&dir, 1000), false);

    let req = TestRequest::post()
        .uri("/api/utm-logs")
        .insert_header(("User-Agent", "TestAgent/1.0"))
        .set_json(json!({
            "utm_source": "google",
            "utm_medium": "cpc",
            "url": "https://x.com/landing"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["log"]["utm_source"], "google");
    assert_eq!(body["log"]["user_agent"], "TestAgent/1.0");
    assert!(body["log"].get("utm_campaign").is_none());
    assert!(body["log"]["timestamp"].is_string());

    let req = TestRequest::get().uri("/api/utm-logs").to_request();
    let logs: Value = test::call_and_read_body_json(&app, req).await;
    let first = &logs[0];
    assert_eq!(first["url"], "https://x.com/landing");
    assert_eq!(first["utm_medium"], "cpc");
    assert_eq!(first["user_agent"], "TestAgent/1.0");
}

#[actix_rt::test]
async fn test_get_empty_store_returns_empty_array() {
    let dir = TempDir::new().unwrap();
    let app = app!(file_store(&dir, 1000), false);

    let req = TestRequest::get().uri("/api/utm-logs").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));
}

#[actix_rt::test]
async fn test_missing_user_agent_is_unknown() {
    let dir = TempDir::new().unwrap();
    let app = app!(file_store(&dir, 1000), false);

    let req = TestRequest::post()
        .uri("/api/utm-logs")
        .set_json(json!({"url": "https://x.com"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["log"]["user_agent"], "Unknown");
}

#[actix_rt::test]
async fn test_malformed_json_is_500() {
    let dir = TempDir::new().unwrap();
    let app = app!(file_store(&dir, 1000), false);

    let req = TestRequest::post()
        .uri("/api/utm-logs")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Failed to save log");
    assert!(body["details"].is_string());
}

#[actix_rt::test]
async fn test_missing_url_is_500() {
    let dir = TempDir::new().unwrap();
    let app = app!(file_store(&dir, 1000), false);

    let req = TestRequest::post()
        .uri("/api/utm-logs")
        .set_json(json!({"utm_source": "google"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_rt::test]
async fn test_cap_enforced_through_api() {
    let dir = TempDir::new().unwrap();
    let app = app!(file_store(&dir, 3), false);

    for n in 0..5 {
        let req = TestRequest::post()
            .uri("/api/utm-logs")
            .set_json(json!({"utm_campaign": format!("c{}", n), "url": "https://x.com"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = TestRequest::get().uri("/api/utm-logs").to_request();
    let logs: Value = test::call_and_read_body_json(&app, req).await;
    let campaigns: Vec<&str> = logs
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["utm_campaign"].as_str().unwrap())
        .collect();
    assert_eq!(campaigns, vec!["c4", "c3", "c2"]);
}

#[actix_rt::test]
async fn test_storage_failure_is_500() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("utm-logs.json");
    std::fs::write(&path, "garbage").unwrap();
    let storage: Arc<dyn UtmLogStore> = Arc::new(FileStorage::new(&path, 1000));
    let app = app!(storage, false);

    let req = TestRequest::get().uri("/api/utm-logs").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Failed to get logs");

    let req = TestRequest::post()
        .uri("/api/utm-logs")
        .set_json(json!({"url": "https://x.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "garbage");
}

#[actix_rt::test]
async fn test_init_db_only_mounted_for_relational() {
    let dir = TempDir::new().unwrap();
    let app = app!(file_store(&dir, 1000), false);
    let req = TestRequest::get().uri("/api/init-db").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_init_db_creates_table() {
    let dir = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display());
    let storage: Arc<dyn UtmLogStore> =
        Arc::new(RelationalStorage::new(&db_url, 1, 100, false).await.unwrap());
    let app = app!(storage, true);

    let req = TestRequest::get().uri("/api/init-db").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Database initialized successfully");

    let req = TestRequest::post()
        .uri("/api/utm-logs")
        .set_json(json!({"utm_source": "newsletter", "url": "https://x.com/a"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = TestRequest::get().uri("/api/utm-logs").to_request();
    let logs: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(logs[0]["utm_source"], "newsletter");
}
