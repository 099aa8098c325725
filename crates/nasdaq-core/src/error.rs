//! 로더 핵심 에러 타입.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 잘못된 심볼 (빈 문자열, 허용되지 않는 문자)
    #[error("잘못된 심볼: {0}")]
    InvalidSymbol(String),

    /// 날짜 파싱 실패
    #[error("잘못된 날짜: {0}")]
    InvalidDate(String),
}

/// 외부 응답을 `PriceBar`로 변환할 때 발생하는 검증 에러.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarValidationError {
    /// 날짜(타임스탬프) 누락 또는 범위 밖
    #[error("missing or invalid date (timestamp={0:?})")]
    MissingDate(Option<i64>),

    /// 종가 누락
    #[error("missing close price on {0}")]
    MissingClose(chrono::NaiveDate),

    /// 음수 가격
    #[error("negative {field} price {value} on {date}")]
    NegativePrice {
        field: &'static str,
        value: f64,
        date: chrono::NaiveDate,
    },
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;
