//! Repository Pattern Implementation
//!
//! # Interview Q&A
//!
//! Q: 왜 Repository trait로 분리했는가?
//! A: 서비스 레이어가 저장소 구현에 의존하지 않도록
//!
//!    - 서비스는 `Arc<dyn InvoiceRepository>` 만 알고 있음
//!    - PostgreSQL 구현: `db/mod.rs` 의 `Database`
//!    - 테스트: 같은 제약(unique, cascade)을 지키는 in-memory Mock
//!
//! Q: 중복 검사를 trait에 따로 두지 않은 이유는?
//! A: `insert`/`update` 자체가 unique 제약 위반을 `StoreError::Duplicate` 로 돌려줌
//!    - 사전 조회(`find_by_number`)는 UX용 fast path 일 뿐
//!    - 정합성은 저장소의 원자적 제약에 맡김

use async_trait::async_trait;

use super::error::StoreResult;
use super::models::{Invoice, InvoiceFields, VerificationLog};

/// 인보이스 레지스트리 저장소
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// 정확히 일치하는 번호 조회 (대소문자 구분)
    async fn find_by_number(&self, invoice_number: &str) -> StoreResult<Option<Invoice>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Invoice>>;

    /// 번호 충돌 시 `StoreError::Duplicate`
    async fn insert(&self, fields: &InvoiceFields) -> StoreResult<Invoice>;

    /// 다른 행과 번호 충돌 시 `Duplicate`, 대상이 없으면 `NotFound`
    async fn update(&self, id: i64, fields: &InvoiceFields) -> StoreResult<Invoice>;

    /// 인보이스와 해당 번호의 감사 로그를 함께 삭제. 대상이 없으면 `NotFound`
    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// 최신 생성순
    async fn list_all(&self) -> StoreResult<Vec<Invoice>>;

    /// 저장소 연결 확인
    async fn ping(&self) -> StoreResult<()>;
}

/// 검증 감사 로그 저장소 (append-only)
#[async_trait]
pub trait VerificationLogRepository: Send + Sync {
    /// 레지스트리에 없는 번호여도 성공해야 함
    async fn record(&self, invoice_number: &str, ip_address: &str) -> StoreResult<()>;

    async fn count_for(&self, invoice_number: &str) -> StoreResult<i64>;
}

// 테스트용 Mock 구현:
