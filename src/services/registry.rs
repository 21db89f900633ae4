//! Registry Admin Service
//!
//! 관리자 전용 인보이스 생성/수정/삭제.
//!
//! # Pipeline
//!
//! ```text
//! Validate → Sanitize → DuplicateCheck → Persist → Result
//! ```
//!
//! DuplicateCheck 의 사전 조회는 UX용 fast path 입니다.
//! 최종 판정은 Persist 단계에서 저장소의 unique 제약이 내립니다.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Invoice, InvoiceFields, InvoiceRepository, StoreError};
use crate::sanitize::{
    is_blank, sanitize, sanitize_invoice_number, sanitize_optional, MAX_NAME_LEN, MAX_NUMBER_LEN,
};

/// 관리자 폼 입력 (원본 그대로)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InvoiceForm {
    pub invoice_number: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub beneficiary_name: Option<String>,
}

impl From<&InvoiceFields> for InvoiceForm {
    fn from(fields: &InvoiceFields) -> Self {
        Self {
            invoice_number: Some(fields.invoice_number.clone()),
            bank_name: Some(fields.bank_name.clone()),
            bank_account_number: Some(fields.bank_account_number.clone()),
            beneficiary_name: fields.beneficiary_name.clone(),
        }
    }
}

/// 필드 단위 검증 에러
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    /// 저장소 접근 전에 거부됨. 원본 입력을 그대로 되돌려줌
    #[error("Validation failed on {}: {}", .error.field, .error.message)]
    Validation {
        error: FieldError,
        submitted: InvoiceForm,
    },

    /// sanitize 된 입력을 되돌려줌
    #[error("Invoice number already exists: {invoice_number}")]
    Duplicate {
        invoice_number: String,
        submitted: InvoiceForm,
    },

    #[error("Invoice not found: {id}")]
    NotFound { id: i64 },

    #[error(transparent)]
    Store(StoreError),
}

impl RegistryError {
    fn duplicate(fields: &InvoiceFields) -> Self {
        RegistryError::Duplicate {
            invoice_number: fields.invoice_number.clone(),
            submitted: fields.into(),
        }
    }

    /// 쓰기 실패 변환. unique 위반은 어떤 경로로 와도 Duplicate
    fn from_write(err: StoreError, fields: &InvoiceFields) -> Self {
        match err {
            StoreError::Duplicate { .. } => Self::duplicate(fields),
            StoreError::NotFound { id } => RegistryError::NotFound { id },
            other => RegistryError::Store(other),
        }
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { id } => RegistryError::NotFound { id },
            other => RegistryError::Store(other),
        }
    }
}

pub struct RegistryAdminService {
    invoices: Arc<dyn InvoiceRepository>,
}

impl RegistryAdminService {
    pub fn new(invoices: Arc<dyn InvoiceRepository>) -> Self {
        Self { invoices }
    }

    /// 관리자 대시보드용 전체 목록 (최신순)
    pub async fn list(&self) -> Result<Vec<Invoice>, RegistryError> {
        Ok(self.invoices.list_all().await?)
    }

    /// 수정 폼용 단건 조회
    pub async fn get(&self, id: i64) -> Result<Invoice, RegistryError> {
        self.invoices
            .find_by_id(id)
            .await?
            .ok_or(RegistryError::NotFound { id })
    }

    /// 인보이스 등록
    pub async fn create(&self, form: InvoiceForm) -> Result<Invoice, RegistryError> {
        let fields = prepare(&form)?;

        if self.invoices.find_by_number(&fields.invoice_number).await?.is_some() {
            return Err(RegistryError::duplicate(&fields));
        }

        let invoice = self
            .invoices
            .insert(&fields)
            .await
            .map_err(|e| RegistryError::from_write(e, &fields))?;

        tracing::info!(
            invoice_id = invoice.id,
            invoice_number = %invoice.invoice_number,
            "Invoice registered"
        );
        Ok(invoice)
    }

    /// 인보이스 수정
    ///
    /// 중복 검사는 `id` 자신을 제외한 다른 행 대상
    pub async fn update(&self, id: i64, form: InvoiceForm) -> Result<Invoice, RegistryError> {
        let fields = prepare(&form)?;

        if self.invoices.find_by_id(id).await?.is_none() {
            return Err(RegistryError::NotFound { id });
        }

        if let Some(existing) = self.invoices.find_by_number(&fields.invoice_number).await? {
            if existing.id != id {
                return Err(RegistryError::duplicate(&fields));
            }
        }

        let invoice = self
            .invoices
            .update(id, &fields)
            .await
            .map_err(|e| RegistryError::from_write(e, &fields))?;

        tracing::info!(
            invoice_id = invoice.id,
            invoice_number = %invoice.invoice_number,
            "Invoice updated"
        );
        Ok(invoice)
    }

    /// 인보이스 삭제 (해당 번호의 감사 로그도 함께 삭제됨)
    pub async fn delete(&self, id: i64) -> Result<(), RegistryError> {
        self.invoices.delete(id).await?;
        tracing::info!(invoice_id = id, "Invoice deleted");
        Ok(())
    }
}

/// Validate → Sanitize
///
/// 필수 필드 검사는 sanitize 이전 원본 기준
fn prepare(form: &InvoiceForm) -> Result<InvoiceFields, RegistryError> {
    let required = [
        ("invoice_number", "Invoice number", &form.invoice_number),
        ("bank_name", "Bank name", &form.bank_name),
        ("bank_account_number", "Bank account number", &form.bank_account_number),
    ];
    for (field, label, value) in required {
        if is_blank(value.as_deref()) {
            return Err(validation(form, field, format!("{} is required", label)));
        }
    }

    let invoice_number = sanitize_invoice_number(form.invoice_number.as_deref());
    if invoice_number.is_empty() {
        return Err(validation(
            form,
            "invoice_number",
            "Invoice number may only contain letters, digits, hyphens and underscores".to_string(),
        ));
    }

    Ok(InvoiceFields {
        invoice_number,
        bank_name: sanitize(form.bank_name.as_deref(), MAX_NAME_LEN),
        bank_account_number: sanitize(form.bank_account_number.as_deref(), MAX_NUMBER_LEN),
        beneficiary_name: sanitize_optional(form.beneficiary_name.as_deref(), MAX_NAME_LEN),
    })
}

fn validation(form: &InvoiceForm, field: &'static str, message: String) -> RegistryError {
    RegistryError::Validation {
        error: FieldError { field, message },
        submitted: form.clone(),
    }
}
