//! 데이터 모듈 오류 타입.

use std::time::Duration;

use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 데이터 삽입 오류
    #[error("Insert error: {0}")]
    InsertError(String),

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// 외부 소스 요청 실패 (네트워크, HTTP 상태)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 외부 소스가 심볼을 모름
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// 요청 한도 초과
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DataError {
    /// 재시도 가능한 오류인지 확인.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataError::FetchError(_) | DataError::RateLimited(_) | DataError::Timeout(_)
        )
    }

    /// 재시도 전 대기 시간.
    ///
    /// `base`에 시도 횟수를 곱하며, 요청 한도 초과는 4배 더 기다립니다.
    pub fn retry_delay(&self, base: Duration, attempt: u32) -> Duration {
        let factor = match self {
            DataError::RateLimited(_) => 4 * attempt,
            _ => attempt,
        };
        base * factor
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Database(db_err) => DataError::QueryError(db_err.message().to_string()),
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DataError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DataError::MigrationError(err.to_string())
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return DataError::Timeout(err.to_string());
        }
        match err.status() {
            Some(status) if status.as_u16() == 429 => DataError::RateLimited(err.to_string()),
            _ => DataError::FetchError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
