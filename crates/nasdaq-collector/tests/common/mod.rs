//! Stub collaborators shared by the loader integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use nasdaq_collector::config::PriceSyncConfig;
use nasdaq_core::{PriceBar, RawBar};
use nasdaq_data::{
    DataError, FetchedBars, PriceProvider, Result, SymbolListProvider, SymbolListing,
};

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn bar(symbol: &str, date: NaiveDate, close: f64) -> PriceBar {
    PriceBar::new(symbol, date, close)
        .with_ohl(close, close + 1.0, close - 1.0)
        .with_adj_close(close)
        .with_volume(1_000)
}

/// Sync options pinned to a fixed end date with no request delay.
pub fn sync_config(end: NaiveDate) -> PriceSyncConfig {
    PriceSyncConfig {
        end_date: Some(end),
        request_delay_ms: 0,
        ..PriceSyncConfig::default()
    }
}

/// Symbol list that either returns a fixed list or fails.
pub struct StubSymbols {
    symbols: Vec<String>,
    error: Option<String>,
}

impl StubSymbols {
    pub fn new(symbols: &[&str]) -> Self {
        Self {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            symbols: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

#[async_trait]
impl SymbolListProvider for StubSymbols {
    async fn fetch_symbols(&self) -> Result<Vec<SymbolListing>> {
        match &self.error {
            Some(reason) => Err(DataError::FetchError(reason.clone())),
            None => Ok(self.symbols.iter().map(SymbolListing::new).collect()),
        }
    }
}

pub type RequestLog = Arc<Mutex<Vec<(String, NaiveDate, NaiveDate)>>>;

/// In-memory price source keyed by symbol.
///
/// Bars are filtered to the requested range. Symbols in `failing` return a
/// fetch error and symbols in `hanging` never complete.
#[derive(Default)]
pub struct StubPrices {
    bars: HashMap<String, Vec<PriceBar>>,
    raw: HashMap<String, Vec<RawBar>>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    requests: RequestLog,
}

impl StubPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(symbol.to_string(), bars);
        self
    }

    /// Rows returned as-is through boundary validation, ignoring the range.
    pub fn with_raw(mut self, symbol: &str, rows: Vec<RawBar>) -> Self {
        self.raw.insert(symbol.to_string(), rows);
        self
    }

    pub fn with_failure(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn with_hang(mut self, symbol: &str) -> Self {
        self.hanging.insert(symbol.to_string());
        self
    }

    pub fn requests(&self) -> RequestLog {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl PriceProvider for StubPrices {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchedBars> {
        self.requests
            .lock()
            .unwrap()
            .push((symbol.to_string(), start, end));

        if self.hanging.contains(symbol) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(symbol) {
            return Err(DataError::FetchError(format!("{}: connection reset", symbol)));
        }
        if let Some(rows) = self.raw.get(symbol) {
            return Ok(FetchedBars::from_raw(symbol, rows.clone()));
        }

        let bars = self
            .bars
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(FetchedBars::new(bars))
    }
}
