//! Yahoo Finance 일봉 제공자.
//!
//! Yahoo Finance chart API(v8)를 직접 호출하여 일봉(`1d`)을 조회합니다.
//! 응답의 각 값은 `null`일 수 있으므로 `Option` 그대로 `RawBar`로 옮기고,
//! 검증은 `FetchedBars::from_raw`에 맡깁니다.
//!
//! Yahoo의 종료 시각(`period2`)은 배타적이므로 `end + 1일` 자정(UTC)까지 요청합니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::{FetchedBars, PriceProvider};
use crate::error::{DataError, Result};
use nasdaq_core::{to_yahoo_symbol, RawBar};

/// Yahoo Finance chart API 기본 URL.
pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance API v8 응답 구조
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(rename = "adjclose")]
    adj_close: Option<Vec<ChartAdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<i64>>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(rename = "adjclose")]
    adj_close: Option<Vec<Option<f64>>>,
}

/// Yahoo Finance 일봉 제공자.
pub struct YahooPriceProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooPriceProvider {
    /// 새로운 Yahoo Finance 제공자 생성.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: YAHOO_CHART_URL.to_string(),
        })
    }

    /// chart API URL 변경 (테스트 서버).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl PriceProvider for YahooPriceProvider {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchedBars> {
        let yahoo_symbol = to_yahoo_symbol(symbol);
        let (period1, period2) = period_bounds(start, end)?;

        debug!(
            symbol = symbol,
            yahoo_symbol = %yahoo_symbol,
            start = %start,
            end = %end,
            "Yahoo Finance 일봉 조회"
        );

        let response = self
            .client
            .get(format!("{}/{}", self.base_url, yahoo_symbol))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(DataError::RateLimited(format!("{}: HTTP {}", symbol, status)))
            }
            StatusCode::NOT_FOUND => return Err(DataError::SymbolNotFound(symbol.to_string())),
            s if s.is_success() || s == StatusCode::BAD_REQUEST => {}
            s => {
                return Err(DataError::FetchError(format!(
                    "Yahoo Finance API 오류 ({}): HTTP {}",
                    symbol, s
                )))
            }
        }

        let body = response.text().await?;
        let raw = parse_chart(symbol, &body)?;
        if raw.is_empty() {
            debug!(symbol = symbol, "Yahoo Finance 데이터 없음");
        }

        Ok(FetchedBars::from_raw(symbol, raw))
    }
}

/// chart API 응답 본문을 원시 일봉 행으로 변환.
///
/// `null` 값은 `None`으로 남기며, 구간에 거래일이 없으면 빈 목록입니다.
pub fn parse_chart(symbol: &str, body: &str) -> Result<Vec<RawBar>> {
    let response: ChartResponse = serde_json::from_str(body).map_err(|e| {
        DataError::ParseError(format!("{}: Yahoo chart 응답 파싱 실패: {}", symbol, e))
    })?;

    if let Some(error) = response.chart.error {
        return chart_error(symbol, error);
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adj_close = result
        .indicators
        .adj_close
        .and_then(|ac| ac.into_iter().next())
        .and_then(|ac| ac.adj_close);

    Ok(timestamps
        .iter()
        .enumerate()
        .map(|(i, &ts)| RawBar {
            timestamp: Some(ts),
            open: value_at(&quote.open, i),
            high: value_at(&quote.high, i),
            low: value_at(&quote.low, i),
            close: value_at(&quote.close, i),
            adj_close: value_at(&adj_close, i),
            volume: value_at(&quote.volume, i),
        })
        .collect())
}

/// 응답의 `chart.error`를 분류. 구간에 데이터가 없다는 응답은 빈 결과입니다.
fn chart_error(symbol: &str, error: ChartError) -> Result<Vec<RawBar>> {
    let description = error.description.to_lowercase();
    if description.contains("data doesn't exist") || description.contains("no data found for") {
        return Ok(Vec::new());
    }
    if error.code.eq_ignore_ascii_case("not found") || description.contains("delisted") {
        return Err(DataError::SymbolNotFound(symbol.to_string()));
    }
    Err(DataError::FetchError(format!(
        "Yahoo Finance API 오류 ({}): {} - {}",
        symbol, error.code, error.description
    )))
}

fn value_at<T: Copy>(series: &Option<Vec<Option<T>>>, index: usize) -> Option<T> {
    series.as_ref().and_then(|s| s.get(index).copied().flatten())
}

/// `[start, end]`를 `period1`/`period2` 유닉스 시각으로 변환 (`period2`는 배타적).
fn period_bounds(start: NaiveDate, end: NaiveDate) -> Result<(i64, i64)> {
    let exclusive_end = end
        .succ_opt()
        .ok_or_else(|| DataError::ParseError(format!("end date out of range: {}", end)))?;

    let midnight = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc().timestamp();
    Ok((midnight(start), midnight(exclusive_end)))
}
