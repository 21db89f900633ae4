//! Input Sanitization
//!
//! 저장, 조회, 로그 기록 전에 신뢰할 수 없는 입력을 정규화합니다.
//!
//! # Rules
//!
//! - 앞뒤 공백 제거
//! - 필드별 최대 길이로 잘라냄 (에러 아님, silent truncation)
//! - 인보이스 번호는 `[A-Za-z0-9_-]` 외 문자를 모두 제거
//!
//! 모든 함수는 순수 함수이며 `f(f(x)) == f(x)` 를 만족합니다.

/// 은행명, 수취인명 최대 길이
pub const MAX_NAME_LEN: usize = 255;

/// 계좌번호, 인보이스 번호 최대 길이
pub const MAX_NUMBER_LEN: usize = 100;

/// IP 주소 최대 길이 (IPv6 표기 포함)
pub const MAX_IP_LEN: usize = 45;

/// 일반 텍스트 필드 정규화
///
/// `None` 또는 공백뿐인 입력은 빈 문자열이 됩니다.
/// 빈 결과를 에러로 볼지는 호출자가 결정합니다.
pub fn sanitize(raw: Option<&str>, max_len: usize) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    // 문자 단위로 자름 (UTF-8 경계에서 panic 방지)
    let truncated: String = raw.trim().chars().take(max_len).collect();

    // 잘린 위치에 공백이 남을 수 있으므로 한 번 더 trim
    truncated.trim_end().to_string()
}

/// 선택 필드 정규화: 비어 있으면 `None` (빈 문자열로 저장하지 않음)
pub fn sanitize_optional(raw: Option<&str>, max_len: usize) -> Option<String> {
    let value = sanitize(raw, max_len);
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// 인보이스 번호 정규화
///
/// 저장 키이자 감사 로그 필드이므로 허용 문자 목록을 강제합니다.
/// 허용 문자만 순서대로 남긴 뒤 [`MAX_NUMBER_LEN`] 으로 자릅니다.
pub fn sanitize_invoice_number(raw: Option<&str>) -> String {
    raw.unwrap_or_default()
        .chars()
        .filter(|&c| is_invoice_number_char(c))
        .take(MAX_NUMBER_LEN)
        .collect()
}

/// 필수 필드 존재 여부 검사 (sanitize 이전의 원본 기준)
pub fn is_blank(raw: Option<&str>) -> bool {
    raw.map_or(true, |s| s.trim().is_empty())
}

fn is_invoice_number_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}
