//! Store Errors
//!
//! Duplicate 판정은 사전 조회가 아니라 DB의 unique 제약 위반에서 나옵니다.
//! 동시에 들어온 두 create 요청이 모두 사전 조회를 통과할 수 있기 때문입니다.

use thiserror::Error;

/// PostgreSQL unique_violation SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invoice number already exists: {invoice_number}")]
    Duplicate { invoice_number: String },

    #[error("Invoice not found: {id}")]
    NotFound { id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// INSERT/UPDATE 실패를 도메인 에러로 변환
    ///
    /// unique 제약 위반만 `Duplicate`, 나머지는 그대로 `Database`
    pub fn from_write(err: sqlx::Error, invoice_number: &str) -> Self {
        if is_unique_violation(&err) {
            StoreError::Duplicate {
                invoice_number: invoice_number.to_string(),
            }
        } else {
            StoreError::Database(err)
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
