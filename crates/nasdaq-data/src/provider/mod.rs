//! 외부 데이터 소스.
//!
//! 로더는 두 외부 협력자에만 의존합니다:
//! - `SymbolListProvider` - 처리할 종목 목록
//! - `PriceProvider` - 심볼과 날짜 범위에 대한 일봉
//!
//! 구체 구현은 NASDAQ Trader 디렉토리(`nasdaq_listed`)와 Yahoo Finance(`yahoo`)이며,
//! `retry` 모듈이 가격 조회에 타임아웃과 재시도를 덧붙입니다.

pub mod nasdaq_listed;
pub mod retry;
pub mod yahoo;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use crate::Result;
use nasdaq_core::{PriceBar, RawBar};

pub use nasdaq_listed::{parse_nasdaq_listed, NasdaqListedProvider, NASDAQ_LISTED_URL};
pub use retry::{RetryPolicy, RetryingPriceProvider};
pub use yahoo::{YahooPriceProvider, YAHOO_CHART_URL};

/// 종목 디렉토리의 한 행.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolListing {
    /// 정규화된 심볼
    pub symbol: String,
    /// 종목명
    pub security_name: String,
    /// 테스트 종목 여부
    pub test_issue: bool,
    /// ETF 여부
    pub etf: bool,
}

impl SymbolListing {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            security_name: String::new(),
            test_issue: false,
            etf: false,
        }
    }
}

/// 종목 목록 제공자.
#[async_trait]
pub trait SymbolListProvider: Send + Sync {
    /// 전체 종목 목록을 원래 순서대로 조회.
    async fn fetch_symbols(&self) -> Result<Vec<SymbolListing>>;
}

/// 일봉 가격 제공자.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// `[start, end]` (양끝 포함) 구간의 일봉 조회.
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchedBars>;
}

#[async_trait]
impl<T: PriceProvider + ?Sized> PriceProvider for Arc<T> {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchedBars> {
        (**self).fetch_daily_bars(symbol, start, end).await
    }
}

#[async_trait]
impl<T: SymbolListProvider + ?Sized> SymbolListProvider for Arc<T> {
    async fn fetch_symbols(&self) -> Result<Vec<SymbolListing>> {
        (**self).fetch_symbols().await
    }
}

/// 검증을 마친 일봉 조회 결과.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedBars {
    /// 날짜 오름차순, 날짜당 하나
    pub bars: Vec<PriceBar>,
    /// 검증에 실패해 버려진 행 수
    pub rejected: usize,
}

impl FetchedBars {
    /// 이미 검증된 일봉으로 결과 생성 (날짜순 정렬, 중복 날짜 제거).
    pub fn new(bars: Vec<PriceBar>) -> Self {
        let mut by_date = BTreeMap::new();
        for bar in bars {
            by_date.entry(bar.date).or_insert(bar);
        }
        Self {
            bars: by_date.into_values().collect(),
            rejected: 0,
        }
    }

    /// 원시 응답 행을 검증하여 결과 생성.
    ///
    /// 필수 필드(날짜, 종가)가 없거나 음수 가격인 행은 버리고 개수만 기록합니다.
    pub fn from_raw(symbol: &str, raw: Vec<RawBar>) -> Self {
        let mut bars = Vec::with_capacity(raw.len());
        let mut rejected = 0;

        for row in raw {
            match row.into_price_bar(symbol) {
                Ok(bar) => bars.push(bar),
                Err(e) => {
                    rejected += 1;
                    debug!(symbol = symbol, error = %e, "일봉 행 거부");
                }
            }
        }

        Self {
            rejected,
            ..Self::new(bars)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 가장 최근 일봉 날짜.
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
