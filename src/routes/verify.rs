//! Verification Endpoints
//!
//! 공개 사용자가 인보이스 번호로 입금 계좌를 확인합니다.
//! 모든 시도는 (빈 입력 제외) 감사 로그에 기록됩니다.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Query, State},
    http::{request::Parts, HeaderMap},
    Form, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    services::{PublicInvoiceView, VerificationResult, UNKNOWN_IP},
    AppState,
};

// ============ Request/Response Types ============

/// 검증 요청 (query string 또는 form)
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub invoice_number: Option<String>,
}

/// 검증 결과 응답
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub found: bool,
    /// 조회하지 않은 이유 (예: "missing_input")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// sanitize 후 실제로 조회한 번호
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<PublicInvoiceView>,
}

impl From<VerificationResult> for VerifyResponse {
    fn from(result: VerificationResult) -> Self {
        match result {
            VerificationResult::Found(view) => Self {
                found: true,
                reason: None,
                invoice_number: Some(view.invoice_number.clone()),
                invoice: Some(view),
            },
            VerificationResult::NotFound { invoice_number } => Self {
                found: false,
                reason: None,
                invoice_number: Some(invoice_number),
                invoice: None,
            },
            VerificationResult::MissingInput => Self {
                found: false,
                reason: Some("missing_input".to_string()),
                invoice_number: None,
                invoice: None,
            },
        }
    }
}

// ============ Extractors ============

/// 요청자 IP (best-effort)
///
/// 우선순위: `X-Forwarded-For` 첫 항목 → `X-Real-IP` → 소켓 주소 → "unknown"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());
        Ok(ClientIp(client_ip(&parts.headers, peer)))
    }
}

fn client_ip(headers: &HeaderMap, peer: Option<String>) -> String {
    header_value(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header_value(headers, "x-real-ip"))
        .map(str::to_string)
        .or(peer)
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

// ============ Handlers ============

/// GET /verify?invoice_number=INV-001
///
/// # Response
///
/// ```json
/// {
///   "found": true,
///   "invoice_number": "INV-001",
///   "invoice": {
///     "invoice_number": "INV-001",
///     "bank_name": "Acme Bank",
///     "bank_account_number": "12345",
///     "beneficiary_name": "Acme Corp"
///   }
/// }
/// ```
pub async fn verify_invoice(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Query(req): Query<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    run_verification(&state, req, &ip).await
}

/// POST /verify (form)
pub async fn verify_invoice_form(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Form(req): Form<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    run_verification(&state, req, &ip).await
}

async fn run_verification(
    state: &AppState,
    req: VerifyRequest,
    ip: &str,
) -> Result<Json<VerifyResponse>, ApiError> {
    let result = state
        .verification
        .verify(req.invoice_number.as_deref(), ip)
        .await
        .map_err(|e| {
            // 상세 내용은 서버 로그에만
            tracing::error!("Verification lookup failed: {:?}", e);
            ApiError::ServiceUnavailable("Verification service".to_string())
        })?;

    Ok(Json(result.into()))
}
