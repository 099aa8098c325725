//! 외부 데이터 소스와 SQLite 저장소.
//!
//! 이 crate는 다음을 제공합니다:
//! - NASDAQ 상장 종목 목록 조회 (`nasdaqlisted.txt`)
//! - Yahoo Finance 일봉 조회 및 재시도/타임아웃 래퍼
//! - 일봉(`prices`)과 메타데이터(`metadata`) SQLite 저장소

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

// 데이터 소스 재내보내기
pub use provider::{
    FetchedBars, NasdaqListedProvider, PriceProvider, RetryPolicy, RetryingPriceProvider,
    SymbolListProvider, SymbolListing, YahooPriceProvider,
};

// 저장소 재내보내기
pub use storage::{
    Database, DatabaseConfig, MetadataRepository, PriceRepository, LAST_SYNC_TIMESTAMP_KEY,
    LATEST_BAR_DATE_KEY,
};
