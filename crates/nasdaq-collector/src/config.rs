//! 환경변수 기반 설정 모듈.
//!
//! `.env` 파일과 환경변수에서 읽고, CLI 플래그가 있으면 그 값으로 덮어씁니다.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::CollectorError;
use crate::Result;
use nasdaq_core::parse_date;
use nasdaq_data::provider::NASDAQ_LISTED_URL;
use nasdaq_data::{DatabaseConfig, RetryPolicy};

/// 커서가 없는 심볼의 기본 시작일
pub const DEFAULT_START_DATE: &str = "2010-01-01";

/// 기본 SQLite 파일 경로
pub const DEFAULT_DATABASE_PATH: &str = "nasdaq_prices.db";

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// SQLite 파일 경로
    pub database_path: PathBuf,
    /// 종목 목록 설정
    pub symbol_source: SymbolSourceConfig,
    /// 일봉 동기화 설정
    pub price_sync: PriceSyncConfig,
}

/// 종목 목록 설정
#[derive(Debug, Clone)]
pub struct SymbolSourceConfig {
    /// `nasdaqlisted.txt` URL
    pub url: String,
    /// 테스트 종목 포함 여부
    pub include_test_issues: bool,
}

/// 일봉 동기화 설정
#[derive(Debug, Clone)]
pub struct PriceSyncConfig {
    /// 커서가 없을 때의 시작일
    pub default_start_date: NaiveDate,
    /// 모든 심볼에 일괄 적용할 시작일 (커서 무시)
    pub start_date: Option<NaiveDate>,
    /// 종료일 (기본: UTC 오늘)
    pub end_date: Option<NaiveDate>,
    /// 처리할 최대 심볼 수 (목록 앞에서부터)
    pub symbol_limit: Option<usize>,
    /// 동시 조회 수
    pub concurrency: usize,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 재시도 횟수
    pub max_retries: u32,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            symbol_source: SymbolSourceConfig::default(),
            price_sync: PriceSyncConfig::default(),
        }
    }
}

impl Default for SymbolSourceConfig {
    fn default() -> Self {
        Self {
            url: NASDAQ_LISTED_URL.to_string(),
            include_test_issues: true,
        }
    }
}

impl Default for PriceSyncConfig {
    fn default() -> Self {
        Self {
            default_start_date: default_start_date(),
            start_date: None,
            end_date: None,
            symbol_limit: None,
            concurrency: 1,
            request_timeout_secs: 30,
            max_retries: 2,
            request_delay_ms: 0,
        }
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let default_start_date = match env_var_date("NASDAQ_DEFAULT_START_DATE")? {
            Some(date) => date,
            None => default_start_date(),
        };

        Ok(Self {
            database_path: std::env::var("NASDAQ_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATABASE_PATH)),
            symbol_source: SymbolSourceConfig {
                url: std::env::var("NASDAQ_SYMBOL_LIST_URL")
                    .unwrap_or_else(|_| NASDAQ_LISTED_URL.to_string()),
                include_test_issues: env_var_bool("NASDAQ_INCLUDE_TEST_ISSUES", true),
            },
            price_sync: PriceSyncConfig {
                default_start_date,
                start_date: env_var_date("NASDAQ_START_DATE")?,
                end_date: env_var_date("NASDAQ_END_DATE")?,
                symbol_limit: env_var_parse_strict("NASDAQ_SYMBOL_LIMIT")?,
                concurrency: env_var_parse("NASDAQ_CONCURRENCY", 1),
                request_timeout_secs: env_var_parse("NASDAQ_REQUEST_TIMEOUT_SECS", 30),
                max_retries: env_var_parse("NASDAQ_MAX_RETRIES", 2),
                request_delay_ms: env_var_parse("NASDAQ_REQUEST_DELAY_MS", 200),
            },
        })
    }

    /// 데이터베이스 설정
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_path)
    }
}

impl PriceSyncConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// 가격 조회 재시도 정책
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..RetryPolicy::default()
        }
    }
}

fn default_start_date() -> NaiveDate {
    // 상수 문자열이므로 파싱은 실패하지 않음
    parse_date(DEFAULT_START_DATE).unwrap_or(NaiveDate::MIN)
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수에서 값을 파싱 (설정되어 있는데 형식이 틀리면 설정 에러)
fn env_var_parse_strict<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CollectorError::Config(format!("{}={}: {}", key, value, e))),
        _ => Ok(None),
    }
}

/// 환경변수에서 bool 값 파싱
fn env_var_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(default)
}

/// 환경변수에서 날짜 파싱 (형식이 틀리면 설정 에러)
fn env_var_date(key: &str) -> Result<Option<NaiveDate>> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => parse_date(&value)
            .map(Some)
            .map_err(|e| CollectorError::Config(format!("{}: {}", key, e))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::default();
        assert_eq!(config.database_path, PathBuf::from("nasdaq_prices.db"));
        assert_eq!(
            config.price_sync.default_start_date,
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()
        );
        assert!(config.symbol_source.include_test_issues);
        assert_eq!(config.price_sync.concurrency, 1);
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = PriceSyncConfig {
            request_timeout_secs: 7,
            max_retries: 5,
            ..Default::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.request_timeout, Duration::from_secs(7));
        assert_eq!(policy.max_retries, 5);
    }

    #[test]
    fn test_env_var_date_rejects_bad_format() {
        std::env::set_var("NASDAQ_TEST_BAD_DATE", "01/02/2020");
        assert!(env_var_date("NASDAQ_TEST_BAD_DATE").is_err());
        std::env::set_var("NASDAQ_TEST_GOOD_DATE", "2020-01-02");
        assert_eq!(
            env_var_date("NASDAQ_TEST_GOOD_DATE").unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 2)
        );
        assert_eq!(env_var_date("NASDAQ_TEST_UNSET_DATE").unwrap(), None);
    }

    #[test]
    fn test_symbol_limit_rejects_non_numeric() {
        std::env::set_var("NASDAQ_TEST_BAD_LIMIT", "abc");
        let err = env_var_parse_strict::<usize>("NASDAQ_TEST_BAD_LIMIT").unwrap_err();
        assert!(matches!(err, CollectorError::Config(msg) if msg.contains("NASDAQ_TEST_BAD_LIMIT")));

        std::env::set_var("NASDAQ_TEST_GOOD_LIMIT", " 25 ");
        assert_eq!(
            env_var_parse_strict::<usize>("NASDAQ_TEST_GOOD_LIMIT").unwrap(),
            Some(25)
        );
        assert_eq!(
            env_var_parse_strict::<usize>("NASDAQ_TEST_UNSET_LIMIT").unwrap(),
            None
        );
    }
}
