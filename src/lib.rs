//! Invoice Verification API Library
//!
//! # Overview
//!
//! 공개 사용자는 인보이스 번호로 입금 계좌가 맞는지 확인하고 (사기 방지),
//! 관리자는 인보이스 → 계좌 레지스트리를 관리합니다.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          API                              │
//! │                                                           │
//! │  ┌─────────┐   ┌──────────┐   ┌──────────────────────┐   │
//! │  │ Routes  │──▶│ Sanitize │──▶│ Services             │   │
//! │  │         │   └──────────┘   │  VerificationService │   │
//! │  │  auth ◀─┤                  │  RegistryAdminService│   │
//! │  └─────────┘                  └──────────┬───────────┘   │
//! │                                          │               │
//! └──────────────────────────────────────────┼───────────────┘
//!                                            ▼
//!                               ┌────────────────────────┐
//!                               │ PostgreSQL             │
//!                               │  invoices (UNIQUE no.) │
//!                               │  verification_logs     │
//!                               └────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 HTTP 매핑
//! - `sanitize`: 입력 정규화
//! - `db`: 저장소 trait 및 PostgreSQL 구현
//! - `services`: 검증, 레지스트리 관리
//! - `auth`: 관리자 gate
//! - `routes`: HTTP 엔드포인트 핸들러
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use invoice_verification_api::{auth::StaticKeyGate, routes, AppState, Config, Database};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let db = Arc::new(Database::connect(&config).await?);
//!     let gate = Arc::new(StaticKeyGate::new(config.admin_key.as_deref()));
//!     let app = routes::create_router(AppState::new(db, gate, config));
//!
//!     // ... 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod sanitize;
pub mod services;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::ApiError;
pub use services::{RegistryAdminService, VerificationService};

use auth::AdminGate;
use db::{InvoiceRepository, VerificationLogRepository};

/// 애플리케이션 전역 상태
///
/// 저장소 핸들은 시작 시 한 번 만들어 각 서비스에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InvoiceRepository>,
    pub verification: Arc<VerificationService>,
    pub registry: Arc<RegistryAdminService>,
    pub admin_gate: Arc<dyn AdminGate>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, admin_gate: Arc<dyn AdminGate>, config: Config) -> Self
    where
        S: InvoiceRepository + VerificationLogRepository + 'static,
    {
        let verification = VerificationService::new(store.clone(), store.clone());
        let registry = RegistryAdminService::new(store.clone());

        Self {
            store,
            verification: Arc::new(verification),
            registry: Arc::new(registry),
            admin_gate,
            config: Arc::new(config),
        }
    }
}
