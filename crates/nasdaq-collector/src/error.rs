//! 에러 타입 정의.

use std::fmt;

use nasdaq_data::DataError;

/// Collector 에러 타입.
///
/// 모두 실행 전체를 중단시키는 치명적 에러입니다.
/// 심볼별 조회 실패는 에러로 전파되지 않고 `SyncReport`에 기록됩니다.
#[derive(Debug)]
pub enum CollectorError {
    /// 종목 목록을 가져올 수 없음 (조회 시작 전 중단)
    SymbolListUnavailable(DataError),
    /// 저장소 쓰기 실패 (디스크 부족, 손상 등)
    StoreWriteFailed(DataError),
    /// 저장소 연결/조회 실패
    Store(DataError),
    /// 설정 에러
    Config(String),
    /// 데이터 소스 초기화 에러
    DataSource(String),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SymbolListUnavailable(e) => write!(f, "Symbol list unavailable: {}", e),
            Self::StoreWriteFailed(e) => write!(f, "Store write failed: {}", e),
            Self::Store(e) => write!(f, "Store error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::DataSource(msg) => write!(f, "Data source error: {}", msg),
        }
    }
}

impl std::error::Error for CollectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SymbolListUnavailable(e) | Self::StoreWriteFailed(e) | Self::Store(e) => Some(e),
            Self::Config(_) | Self::DataSource(_) => None,
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
