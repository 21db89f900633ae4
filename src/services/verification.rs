//! Verification Service
//!
//! # Interview Q&A
//!
//! Q: 조회에 실패한 번호도 감사 로그에 남기는 이유는?
//! A: 감사 로그의 목적은 레지스트리 탐색(enumeration) 시도 탐지
//!    - 존재하지 않는 번호를 연속으로 조회하는 패턴이 가장 의심스러움
//!    - 그래서 hit/miss 와 무관하게 항상 기록
//!    - 단, 빈 입력은 감사할 내용이 없으므로 기록하지 않음
//!
//! Q: 감사 로그 기록이 실패하면?
//! A: 검증 응답에는 영향 없음
//!    - 로그는 advisory telemetry, 조회와 트랜잭션으로 묶이지 않음
//!    - 기록은 `tokio::spawn` 으로 분리, 응답은 기록 완료를 기다리지 않음
//!    - 실패는 `tracing::warn!` 으로만 남기고 버림

use std::sync::Arc;

use serde::Serialize;

use crate::db::{Invoice, InvoiceRepository, StoreError, VerificationLogRepository};
use crate::sanitize::{sanitize, sanitize_invoice_number, MAX_IP_LEN};

/// IP 를 알 수 없을 때 기록하는 값
pub const UNKNOWN_IP: &str = "unknown";

/// 공개 검증자에게 보여주는 인보이스 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicInvoiceView {
    pub invoice_number: String,
    pub bank_name: String,
    pub bank_account_number: String,
    pub beneficiary_name: Option<String>,
}

impl From<Invoice> for PublicInvoiceView {
    fn from(invoice: Invoice) -> Self {
        Self {
            invoice_number: invoice.invoice_number,
            bank_name: invoice.bank_name,
            bank_account_number: invoice.bank_account_number,
            beneficiary_name: invoice.beneficiary_name,
        }
    }
}

/// 검증 결과
///
/// miss 는 에러가 아니라 정상 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Found(PublicInvoiceView),
    NotFound { invoice_number: String },
    /// 입력이 없거나 sanitize 후 비어 있음 (감사 로그 없음)
    MissingInput,
}

impl VerificationResult {
    pub fn is_found(&self) -> bool {
        matches!(self, VerificationResult::Found(_))
    }
}

pub struct VerificationService {
    invoices: Arc<dyn InvoiceRepository>,
    audit_log: Arc<dyn VerificationLogRepository>,
}

impl VerificationService {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        audit_log: Arc<dyn VerificationLogRepository>,
    ) -> Self {
        Self {
            invoices,
            audit_log,
        }
    }

    /// 인보이스 번호 검증
    ///
    /// # Flow
    ///
    /// 1. 빈 입력 → `MissingInput` (로그 없음)
    /// 2. 허용 문자 목록으로 sanitize, 비면 `MissingInput`
    /// 3. 감사 로그 기록을 백그라운드 task 로 넘김
    /// 4. 레지스트리 조회
    /// 5. hit → `Found`, miss → `NotFound`
    ///
    /// 조회 중 저장소 에러만 `Err` 로 올라감 (재시도 없음)
    pub async fn verify(
        &self,
        raw_invoice_number: Option<&str>,
        ip_address: &str,
    ) -> Result<VerificationResult, StoreError> {
        let invoice_number = sanitize_invoice_number(raw_invoice_number);
        if invoice_number.is_empty() {
            return Ok(VerificationResult::MissingInput);
        }

        let ip_address = normalize_ip(ip_address);

        self.record_attempt(invoice_number.clone(), ip_address);

        let result = match self.invoices.find_by_number(&invoice_number).await? {
            Some(invoice) => VerificationResult::Found(invoice.into()),
            None => VerificationResult::NotFound {
                invoice_number: invoice_number.clone(),
            },
        };

        tracing::info!(
            invoice_number = %invoice_number,
            found = result.is_found(),
            "Verification attempt"
        );

        Ok(result)
    }

    /// best-effort 감사 로그 기록 (fire-and-forget)
    fn record_attempt(&self, invoice_number: String, ip_address: String) {
        let audit_log = self.audit_log.clone();
        tokio::spawn(async move {
            if let Err(e) = audit_log.record(&invoice_number, &ip_address).await {
                tracing::warn!(
                    invoice_number = %invoice_number,
                    "Failed to record verification attempt: {:?}",
                    e
                );
            }
        });
    }
}

fn normalize_ip(ip_address: &str) -> String {
    let ip = sanitize(Some(ip_address), MAX_IP_LEN);
    if ip.is_empty() {
        UNKNOWN_IP.to_string()
    } else {
        ip
    }
}
