//! Error Handling Module
//!
//! Provides type-safe error handling with proper HTTP status code mapping.
//! Uses thiserror for domain errors and integrates with tracing for structured logging.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::{InvoiceForm, RegistryError};

/// API 에러 타입
///
/// # Design Decision
///
/// 각 에러 variant는 적절한 HTTP 상태 코드에 매핑됨
/// - 폼 에러 (검증 실패, 중복): 제출 값을 되돌려줘 관리자가 다시 입력하지 않게 함
/// - 404: 수정/삭제 대상 없음 (되돌아갈 폼이 없음)
/// - 저장소 장애: 관리자/공개 경로 모두 503, 상세 내용은 서버 로그에만 남김
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 403 Forbidden ============
    #[error("Access denied")]
    Forbidden,

    // ============ 404 Not Found ============
    #[error("Resource not found: {0}")]
    NotFound(String),

    // ============ 409 Conflict ============
    #[error("Invoice number already exists: {invoice_number}")]
    Duplicate {
        invoice_number: String,
        submitted: InvoiceForm,
    },

    // ============ 422 Unprocessable Entity ============
    #[error("Validation failed: {message}")]
    ValidationError {
        field: String,
        message: String,
        submitted: InvoiceForm,
    },

    // ============ 500 Internal Server Error ============
    #[error("Admin key not configured")]
    AdminNotConfigured,

    // ============ 503 Service Unavailable ============
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// API 에러 응답 구조
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// 에러가 발생한 폼 필드
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// 폼 재표시용 제출 값
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted: Option<InvoiceForm>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut field = None;
        let mut submitted = None;

        let (status, code, message, details) = match self {
            // 4xx 클라이언트 에러
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Invalid admin key. Access denied.".to_string(),
                None,
            ),
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", resource),
                None,
            ),
            ApiError::Duplicate {
                invoice_number,
                submitted: form,
            } => {
                field = Some("invoice_number".to_string());
                submitted = Some(form);
                (
                    StatusCode::CONFLICT,
                    "DUPLICATE_INVOICE",
                    "Invoice number already exists".to_string(),
                    Some(invoice_number),
                )
            }
            ApiError::ValidationError {
                field: name,
                message,
                submitted: form,
            } => {
                field = Some(name);
                submitted = Some(form);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    message,
                    None,
                )
            }

            // 5xx 서버 에러
            ApiError::AdminNotConfigured => {
                tracing::error!("Admin request rejected: ADMIN_KEY not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ADMIN_NOT_CONFIGURED",
                    "Admin key not configured on server".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(service) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                format!("{} is currently unavailable", service),
                None,
            ),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
            field,
            submitted,
        };

        (status, Json(body)).into_response()
    }
}

/// 레지스트리 서비스 에러를 ApiError로 변환
impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Validation { error, submitted } => ApiError::ValidationError {
                field: error.field.to_string(),
                message: error.message,
                submitted,
            },
            RegistryError::Duplicate {
                invoice_number,
                submitted,
            } => ApiError::Duplicate {
                invoice_number,
                submitted,
            },
            RegistryError::NotFound { id } => ApiError::NotFound(format!("Invoice {}", id)),
            RegistryError::Store(e) => {
                // 상세 내용은 서버 로그에만
                tracing::error!("Registry store error: {:?}", e);
                ApiError::ServiceUnavailable("Invoice registry".to_string())
            }
        }
    }
}
