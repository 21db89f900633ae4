//! Admin Gate
//!
//! 레지스트리 서비스는 관리자 인증을 직접 하지 않습니다.
//! 라우터가 `AdminGate` 에 자격 증명을 넘기고, 결과만 받아 요청을 통과/거부합니다.

use sha3::{Digest, Keccak256};

/// 관리자 권한 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminDecision {
    Granted,
    Denied,
    /// 서버에 관리자 키가 설정되지 않음
    NotConfigured,
}

pub trait AdminGate: Send + Sync {
    fn authorize(&self, credential: Option<&str>) -> AdminDecision;
}

/// `ADMIN_KEY` 환경변수 기반 gate
///
/// 원문 대신 Keccak256 digest 를 보관하고 비교합니다.
/// 고정 길이 digest 끼리 비교하므로 비교 시간이 키의 공통 prefix 길이에 좌우되지 않습니다.
pub struct StaticKeyGate {
    key_digest: Option<[u8; 32]>,
}

impl StaticKeyGate {
    pub fn new(admin_key: Option<&str>) -> Self {
        let key_digest = admin_key.filter(|k| !k.is_empty()).map(digest);
        match &key_digest {
            Some(d) => tracing::debug!(fingerprint = %hex::encode(&d[..4]), "Admin gate configured"),
            None => tracing::warn!("ADMIN_KEY not set; admin routes are disabled"),
        }
        Self { key_digest }
    }
}

impl AdminGate for StaticKeyGate {
    fn authorize(&self, credential: Option<&str>) -> AdminDecision {
        let Some(expected) = &self.key_digest else {
            return AdminDecision::NotConfigured;
        };

        match credential {
            Some(presented) if digest(presented) == *expected => AdminDecision::Granted,
            _ => AdminDecision::Denied,
        }
    }
}

fn digest(key: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}
