//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - 서버 + DB 상태 확인
//! GET  /api/status                   - 프로세스 생존 확인
//!
//! GET  /verify?invoice_number=...    - 인보이스 계좌 검증
//! POST /verify                       - 인보이스 계좌 검증 (form)
//!
//! GET  /admin                        - 레지스트리 목록 (관리자)
//! GET  /admin/invoices/:id           - 단건 조회 (관리자)
//! POST /admin/invoices               - 등록 (관리자)
//! POST /admin/invoices/:id           - 수정 (관리자)
//! POST /admin/invoices/:id/delete    - 삭제 (관리자)
//! ```

pub mod admin;
pub mod health;
pub mod verify;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{error::ApiError, AppState};

/// 라우터 생성
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/api/status", get(health::api_status))

        // Verification
        .route("/verify", get(verify::verify_invoice).post(verify::verify_invoice_form))

        // Admin
        .route("/admin", get(admin::list_invoices))
        .route("/admin/invoices", post(admin::create_invoice))
        .route("/admin/invoices/:id", get(admin::get_invoice).post(admin::update_invoice))
        .route("/admin/invoices/:id/delete", post(admin::delete_invoice))

        .fallback(not_found)

        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}

/// CORS 설정
///
/// 프로덕션: `ALLOWED_ORIGINS` 만 허용
/// 개발: localhost 허용
fn cors_layer(state: &AppState) -> CorsLayer {
    if state.config.is_production() {
        let origins: Vec<HeaderValue> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
                HeaderValue::from_static("http://localhost:5173"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Page".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::auth::StaticKeyGate;
    use crate::config::Config;
    use crate::db::mock::MockStore;
    use crate::db::{InvoiceRepository, VerificationLogRepository};

    const KEY: &str = "test-admin-key";
    const FORM: &str = "application/x-www-form-urlencoded";

    fn test_app(admin_key: Option<&str>) -> (Arc<MockStore>, Router) {
        let store = Arc::new(MockStore::new());
        let config = Config::from_lookup(|_| None).unwrap();
        let state = AppState::new(store.clone(), Arc::new(StaticKeyGate::new(admin_key)), config);
        (store, create_router(state))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        form: Option<&str>,
        admin_key: Option<&str>,
    ) -> (StatusCode, Option<String>, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if form.is_some() {
            builder = builder.header(header::CONTENT_TYPE, FORM);
        }
        if let Some(key) = admin_key {
            builder = builder.header(admin::ADMIN_KEY_HEADER, key);
        }
        let body = form.map(|f| Body::from(f.to_string())).unwrap_or_else(Body::empty);

        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, location, json)
    }

    #[tokio::test]
    async fn test_verify_found_and_logged() {
        let (store, app) = test_app(Some(KEY));
        let (status, location, _) = send(
            &app,
            Method::POST,
            "/admin/invoices",
            Some("invoice_number=INV-001&bank_name=Acme+Bank&bank_account_number=12345"),
            Some(KEY),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/admin"));

        let (status, _, body) = send(&app, Method::GET, "/verify?invoice_number=INV-001", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["found"], true);
        assert_eq!(body["invoice"]["bank_name"], "Acme Bank");
        assert_eq!(body["invoice"]["bank_account_number"], "12345");
        assert_eq!(store.settle_logs(1).await, 1);
        assert_eq!(store.count_for("INV-001").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_verify_missing_input() {
        let (store, app) = test_app(Some(KEY));

        let (status, _, body) = send(&app, Method::GET, "/verify", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["found"], false);
        assert_eq!(body["reason"], "missing_input");

        let (_, _, body) = send(&app, Method::GET, "/verify?invoice_number=", None, None).await;
        assert_eq!(body["reason"], "missing_input");

        assert_eq!(store.settle_logs(1).await, 0);
    }

    #[tokio::test]
    async fn test_verify_form_miss_records_forwarded_ip() {
        let (store, app) = test_app(Some(KEY));

        let request = Request::builder()
            .method(Method::POST)
            .uri("/verify")
            .header(header::CONTENT_TYPE, FORM)
            .header("x-forwarded-for", "203.0.113.9")
            .body(Body::from("invoice_number=NONEXISTENT"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(store.settle_logs(1).await, 1);
        let logs = store.logs();
        assert_eq!(logs[0].invoice_number, "NONEXISTENT");
        assert_eq!(logs[0].ip_address, "203.0.113.9");
    }

    #[tokio::test]
    async fn test_verify_store_down_is_503() {
        let (store, app) = test_app(Some(KEY));
        store.set_unavailable(true);

        let (status, _, body) = send(&app, Method::GET, "/verify?invoice_number=INV-001", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_admin_store_down_is_503() {
        let (store, app) = test_app(Some(KEY));
        store.set_unavailable(true);

        let (status, _, body) = send(&app, Method::GET, "/admin", None, Some(KEY)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/admin/invoices",
            Some("invoice_number=INV-001&bank_name=Acme&bank_account_number=1"),
            Some(KEY),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Invoice registry is currently unavailable");
    }

    #[tokio::test]
    async fn test_admin_requires_key() {
        let (_store, app) = test_app(Some(KEY));

        let (status, _, _) = send(&app, Method::GET, "/admin", None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(&app, Method::GET, "/admin", None, Some("wrong")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, body) = send(&app, Method::GET, "/admin", None, Some(KEY)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Array(vec![]));
    }

    #[tokio::test]
    async fn test_admin_without_configured_key_is_500() {
        let (_store, app) = test_app(None);
        let (status, _, body) = send(&app, Method::GET, "/admin", None, Some(KEY)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "ADMIN_NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_query_key_is_kept_on_redirect() {
        let (_store, app) = test_app(Some(KEY));
        let uri = format!("/admin/invoices?key={}", KEY);

        let (status, location, _) = send(
            &app,
            Method::POST,
            &uri,
            Some("invoice_number=INV-001&bank_name=Acme&bank_account_number=1"),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location, Some(format!("/admin?key={}", KEY)));
    }

    #[tokio::test]
    async fn test_duplicate_create_echoes_form() {
        let (store, app) = test_app(Some(KEY));
        let first = "invoice_number=INV-001&bank_name=Acme+Bank&bank_account_number=12345";
        send(&app, Method::POST, "/admin/invoices", Some(first), Some(KEY)).await;

        let second = "invoice_number=INV-001&bank_name=Other+Bank&bank_account_number=99999";
        let (status, _, body) = send(&app, Method::POST, "/admin/invoices", Some(second), Some(KEY)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Invoice number already exists");
        assert_eq!(body["field"], "invoice_number");
        assert_eq!(body["submitted"]["bank_name"], "Other Bank");
        assert_eq!(store.invoice_count(), 1);
        let original = store.find_by_number("INV-001").await.unwrap().unwrap();
        assert_eq!(original.bank_name, "Acme Bank");
    }

    #[tokio::test]
    async fn test_validation_error_echoes_raw_form() {
        let (store, app) = test_app(Some(KEY));

        let (status, _, body) = send(
            &app,
            Method::POST,
            "/admin/invoices",
            Some("invoice_number=INV-001&bank_name=&bank_account_number=12345"),
            Some(KEY),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["field"], "bank_name");
        assert_eq!(body["error"], "Bank name is required");
        assert_eq!(body["submitted"]["invoice_number"], "INV-001");
        assert_eq!(store.invoice_count(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete_flow() {
        let (store, app) = test_app(Some(KEY));
        for form in [
            "invoice_number=INV-001&bank_name=Acme&bank_account_number=1",
            "invoice_number=INV-002&bank_name=Beta&bank_account_number=2",
        ] {
            send(&app, Method::POST, "/admin/invoices", Some(form), Some(KEY)).await;
        }
        let first = store.find_by_number("INV-001").await.unwrap().unwrap();

        // 다른 행의 번호로 수정 → 409
        let (status, _, _) = send(
            &app,
            Method::POST,
            &format!("/admin/invoices/{}", first.id),
            Some("invoice_number=INV-002&bank_name=Acme&bank_account_number=1"),
            Some(KEY),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        // 없는 id → 404
        let (status, _, _) = send(
            &app,
            Method::POST,
            "/admin/invoices/999",
            Some("invoice_number=INV-003&bank_name=Acme&bank_account_number=1"),
            Some(KEY),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        for _ in 0..3 {
            send(&app, Method::GET, "/verify?invoice_number=INV-001", None, None).await;
        }
        assert_eq!(store.settle_logs(3).await, 3);
        assert_eq!(store.count_for("INV-001").await.unwrap(), 3);

        let (status, location, _) = send(
            &app,
            Method::POST,
            &format!("/admin/invoices/{}/delete", first.id),
            None,
            Some(KEY),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(location.as_deref(), Some("/admin"));
        assert_eq!(store.count_for("INV-001").await.unwrap(), 0);

        let (status, _, _) = send(
            &app,
            Method::GET,
            &format!("/admin/invoices/{}", first.id),
            None,
            Some(KEY),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, _, body) = send(&app, Method::GET, "/admin", None, Some(KEY)).await;
        let listed = body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["invoice_number"], "INV-002");
    }

    #[tokio::test]
    async fn test_health_and_fallback() {
        let (store, app) = test_app(None);

        let (status, _, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        store.set_unavailable(true);
        let (_, _, body) = send(&app, Method::GET, "/health", None, None).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["database"]["connected"], false);

        let (status, _, body) = send(&app, Method::GET, "/api/status", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "API is running");

        let (status, _, body) = send(&app, Method::GET, "/nope", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Page not found");
    }
}
