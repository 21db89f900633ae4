//! Admin Registry Endpoints
//!
//! 인보이스 레지스트리 관리 (관리자 전용).
//! 자격 증명 판정은 `AdminGate` 에 위임하고, 여기서는 결과만 사용합니다.
//!
//! 성공한 변경 요청은 목록(`/admin`)으로 redirect,
//! 검증 실패/중복은 제출 값과 함께 에러 응답을 돌려줘 폼을 다시 표시하게 합니다.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::request::Parts,
    response::Redirect,
    Form, Json,
};
use serde::Deserialize;

use crate::{
    auth::AdminDecision,
    db::Invoice,
    error::ApiError,
    services::InvoiceForm,
    AppState,
};

/// 관리자 키 헤더
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

// ============ Extractors ============

#[derive(Debug, Deserialize)]
struct AdminKeyQuery {
    key: Option<String>,
}

/// 관리자 권한이 확인된 요청
///
/// 키는 `x-admin-key` 헤더 또는 `?key=` 쿼리로 전달.
/// 쿼리로 받은 경우 redirect 에도 같은 쿼리를 붙여 목록 화면에서 다시 인증되도록 함
#[derive(Debug, Clone)]
pub struct AdminAccess {
    listing_query: Option<String>,
}

impl AdminAccess {
    fn redirect_to_listing(&self) -> Redirect {
        match &self.listing_query {
            Some(query) => Redirect::to(&format!("/admin?{}", query)),
            None => Redirect::to("/admin"),
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAccess {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let from_query = Query::<AdminKeyQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.key);

        let via_query = from_header.is_none() && from_query.is_some();
        let credential = from_header.or(from_query);

        match state.admin_gate.authorize(credential.as_deref()) {
            AdminDecision::Granted => Ok(AdminAccess {
                listing_query: if via_query {
                    parts.uri.query().map(str::to_string)
                } else {
                    None
                },
            }),
            AdminDecision::Denied => {
                tracing::warn!(path = %parts.uri.path(), "Admin access denied");
                Err(ApiError::Forbidden)
            }
            AdminDecision::NotConfigured => Err(ApiError::AdminNotConfigured),
        }
    }
}

// ============ Handlers ============

/// GET /admin
///
/// 전체 레지스트리 (최신 생성순)
pub async fn list_invoices(
    State(state): State<AppState>,
    _admin: AdminAccess,
) -> Result<Json<Vec<Invoice>>, ApiError> {
    Ok(Json(state.registry.list().await?))
}

/// GET /admin/invoices/:id
///
/// 수정 폼에 채울 현재 값
pub async fn get_invoice(
    State(state): State<AppState>,
    _admin: AdminAccess,
    Path(id): Path<i64>,
) -> Result<Json<Invoice>, ApiError> {
    Ok(Json(state.registry.get(id).await?))
}

/// POST /admin/invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    admin: AdminAccess,
    Form(form): Form<InvoiceForm>,
) -> Result<Redirect, ApiError> {
    state.registry.create(form).await?;
    Ok(admin.redirect_to_listing())
}

/// POST /admin/invoices/:id
pub async fn update_invoice(
    State(state): State<AppState>,
    admin: AdminAccess,
    Path(id): Path<i64>,
    Form(form): Form<InvoiceForm>,
) -> Result<Redirect, ApiError> {
    state.registry.update(id, form).await?;
    Ok(admin.redirect_to_listing())
}

/// POST /admin/invoices/:id/delete
pub async fn delete_invoice(
    State(state): State<AppState>,
    admin: AdminAccess,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    state.registry.delete(id).await?;
    Ok(admin.redirect_to_listing())
}
