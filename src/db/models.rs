//! Database Models
//!
//! Invoice registry rows and the verification audit trail.
//! Bank details are stored as plain text because the public verifier displays them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// 인보이스 레지스트리 레코드
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Invoice {
    /// DB가 할당하는 surrogate key
    pub id: i64,

    /// 인보이스 번호 (전역 유일, 대소문자 구분)
    pub invoice_number: String,

    pub bank_name: String,

    pub bank_account_number: String,

    /// 수취인명 (없으면 NULL, 빈 문자열로 저장하지 않음)
    pub beneficiary_name: Option<String>,

    pub created_at: DateTime<Utc>,

    /// 모든 수정 시 갱신
    pub updated_at: DateTime<Utc>,
}

/// 검증 시도 감사 로그
///
/// 레지스트리에 없는 번호도 기록됨 (조회 실패가 가장 중요한 감사 대상)
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct VerificationLog {
    pub id: i64,

    /// sanitize 이후 제출된 번호 그대로
    pub invoice_number: String,

    /// 요청자 IP (추출 불가 시 "unknown")
    pub ip_address: String,

    pub verified_at: DateTime<Utc>,
}

/// 저장할 인보이스 필드 (sanitize 완료된 값만)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFields {
    pub invoice_number: String,
    pub bank_name: String,
    pub bank_account_number: String,
    pub beneficiary_name: Option<String>,
}
