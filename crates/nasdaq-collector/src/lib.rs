//! NASDAQ 일봉 증분 로더.
//!
//! 한 번의 실행은 다음을 순서대로 수행합니다:
//! 1. NASDAQ 상장 종목 목록 조회
//! 2. 심볼별 커서(마지막 저장 날짜) 다음 날부터 오늘까지 일봉 조회
//! 3. 없는 (symbol, date) 행만 삽입
//! 4. 마지막 동기화 시각(워터마크) 기록

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::{SymbolFailure, SyncReport};

use nasdaq_data::{
    Database, NasdaqListedProvider, PriceProvider, RetryingPriceProvider, SymbolListProvider,
    YahooPriceProvider,
};

/// 실제 데이터 소스(NASDAQ Trader, Yahoo Finance)로 한 번의 동기화를 실행.
pub async fn run(config: &CollectorConfig) -> Result<SyncReport> {
    let symbols = NasdaqListedProvider::new()
        .map_err(|e| CollectorError::DataSource(e.to_string()))?
        .with_url(&config.symbol_source.url)
        .with_test_issues(config.symbol_source.include_test_issues);

    let prices = RetryingPriceProvider::new(
        YahooPriceProvider::new().map_err(|e| CollectorError::DataSource(e.to_string()))?,
        config.price_sync.retry_policy(),
    );

    run_with_sources(config, &symbols, &prices).await
}

/// 설정의 SQLite 파일을 열어 주어진 데이터 소스로 한 번의 동기화를 실행.
///
/// 결과와 관계없이 연결 풀을 닫습니다.
pub async fn run_with_sources(
    config: &CollectorConfig,
    symbol_source: &dyn SymbolListProvider,
    price_source: &dyn PriceProvider,
) -> Result<SyncReport> {
    let db = Database::open(&config.database())
        .await
        .map_err(CollectorError::Store)?;

    let result = modules::sync_prices(&db, symbol_source, price_source, &config.price_sync).await;
    db.close().await;
    result
}
