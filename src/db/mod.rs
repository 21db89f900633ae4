//! Database Module
//!
//! # Interview Q&A
//!
//! Q: 중복 인보이스 번호는 어떻게 막는가?
//! A: `invoices.invoice_number` 의 UNIQUE 제약
//!
//!    - 애플리케이션의 "조회 후 삽입"은 race-free 가 아님
//!    - 두 요청이 동시에 사전 조회를 통과해도 INSERT 는 하나만 성공
//!    - 실패한 쪽의 SQLSTATE 23505 를 `StoreError::Duplicate` 로 변환
//!
//! Q: 감사 로그에 FK를 걸지 않은 이유는?
//! A: 레지스트리에 없는 번호로 조회한 시도도 기록해야 함
//!
//!    - 하드 FK 를 걸면 조회 실패 로그가 INSERT 단계에서 거부됨
//!    - 대신 인보이스 삭제 시 같은 트랜잭션에서 해당 번호의 로그를 삭제 (cascade)
//!
//! Q: 커넥션 풀은 어떻게 관리하는가?
//! A: SQLx의 PgPool 사용
//!    - 시작 시 한 번 생성, 서비스에 `Arc` 로 주입
//!    - 종료 시 `close()` 로 반환

mod error;
mod models;
mod repository;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use repository::{InvoiceRepository, VerificationLogRepository};

#[cfg(test)]
pub use repository::mock;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::Config;

const INVOICE_COLUMNS: &str = "id, invoice_number, bank_name, bank_account_number, \
                               beneficiary_name, created_at, updated_at";

/// 데이터베이스 연결 및 쿼리 담당
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// 데이터베이스 연결
    ///
    /// # Connection Pool Settings
    ///
    /// - max_connections: `DB_MAX_CONNECTIONS` (기본 10)
    /// - min_connections: 1 (idle 시 최소 유지)
    /// - acquire_timeout: `DB_ACQUIRE_TIMEOUT_SECS` (기본 3초)
    pub async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(1)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// 이미 만들어진 풀로 생성 (통합 테스트용)
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 마이그레이션 실행
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }

    /// 풀 종료 (진행 중인 커넥션 반환 대기)
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl InvoiceRepository for Database {
    async fn find_by_number(&self, invoice_number: &str) -> StoreResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_number = $1"
        ))
        .bind(invoice_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invoice)
    }

    async fn insert(&self, fields: &InvoiceFields) -> StoreResult<Invoice> {
        sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (
                invoice_number, bank_name, bank_account_number, beneficiary_name
            )
            VALUES ($1, $2, $3, $4)
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(&fields.invoice_number)
        .bind(&fields.bank_name)
        .bind(&fields.bank_account_number)
        .bind(&fields.beneficiary_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, &fields.invoice_number))
    }

    async fn update(&self, id: i64, fields: &InvoiceFields) -> StoreResult<Invoice> {
        let updated = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            UPDATE invoices
            SET invoice_number = $1,
                bank_name = $2,
                bank_account_number = $3,
                beneficiary_name = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(&fields.invoice_number)
        .bind(&fields.bank_name)
        .bind(&fields.bank_account_number)
        .bind(&fields.beneficiary_name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, &fields.invoice_number))?;

        updated.ok_or(StoreError::NotFound { id })
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let removed: Option<(String,)> =
            sqlx::query_as("DELETE FROM invoices WHERE id = $1 RETURNING invoice_number")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        // 대상이 없으면 tx drop 시 rollback
        let Some((invoice_number,)) = removed else {
            return Err(StoreError::NotFound { id });
        };

        // commit 이후 도착한 동시 검증의 로그는 남음 (FK 없음)
        let pruned = sqlx::query("DELETE FROM verification_logs WHERE invoice_number = $1")
            .bind(&invoice_number)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::debug!(
            invoice_id = id,
            invoice_number = %invoice_number,
            pruned_logs = pruned,
            "Invoice deleted with audit cascade"
        );
        Ok(())
    }

    async fn list_all(&self) -> StoreResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(invoices)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl VerificationLogRepository for Database {
    async fn record(&self, invoice_number: &str, ip_address: &str) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO verification_logs (invoice_number, ip_address, verified_at)
            VALUES ($1, $2, NOW())
            "#
        )
        .bind(invoice_number)
        .bind(ip_address)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_for(&self, invoice_number: &str) -> StoreResult<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM verification_logs WHERE invoice_number = $1"
        )
        .bind(invoice_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
