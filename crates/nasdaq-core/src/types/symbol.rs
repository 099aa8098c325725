//! 심볼 정규화 및 날짜 파싱 헬퍼.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};

/// 심볼을 저장 형식으로 정규화합니다 (공백 제거, 대문자).
///
/// 빈 문자열이나 공백/제어 문자가 포함된 심볼은 거부합니다.
pub fn normalize_symbol(raw: &str) -> CoreResult<String> {
    let symbol = raw.trim().to_ascii_uppercase();

    if symbol.is_empty() {
        return Err(CoreError::InvalidSymbol("empty symbol".to_string()));
    }
    if symbol.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CoreError::InvalidSymbol(raw.to_string()));
    }

    Ok(symbol)
}

/// NASDAQ 상장 심볼을 Yahoo Finance 형식으로 변환.
///
/// 클래스 주식 구분자 `.`는 Yahoo에서 `-`를 사용합니다 (예: `BRK.B` -> `BRK-B`).
pub fn to_yahoo_symbol(symbol: &str) -> String {
    symbol.replace('.', "-")
}

/// `YYYY-MM-DD` 형식의 날짜 문자열을 파싱합니다.
pub fn parse_date(value: &str) -> CoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| CoreError::InvalidDate(format!("{}: {}", value, e)))
}
