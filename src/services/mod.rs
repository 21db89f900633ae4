//! Services Module
//!
//! 비즈니스 로직을 담당하는 서비스 레이어
//!
//! # Services
//! - `VerificationService`: 공개 인보이스 검증 + 감사 로그
//! - `RegistryAdminService`: 관리자 레지스트리 관리

mod registry;
mod verification;

pub use registry::{FieldError, InvoiceForm, RegistryAdminService, RegistryError};
pub use verification::{PublicInvoiceView, VerificationResult, VerificationService, UNKNOWN_IP};
