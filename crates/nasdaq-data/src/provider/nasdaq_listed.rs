//! NASDAQ Trader 종목 디렉토리 (`nasdaqlisted.txt`).
//!
//! 파일은 `|`로 구분되며 첫 줄이 헤더, 마지막 줄은 생성 시각 안내입니다:
//!
//! ```text
//! Symbol|Security Name|Market Category|Test Issue|Financial Status|Round Lot Size|ETF|NextShares
//! AAPL|Apple Inc. - Common Stock|Q|N|N|100|N|N
//! ...
//! File Creation Time: 0119202622:01|||||||
//! ```

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::{SymbolListProvider, SymbolListing};
use crate::error::{DataError, Result};
use nasdaq_core::normalize_symbol;

/// NASDAQ 상장 종목 디렉토리 URL.
pub const NASDAQ_LISTED_URL: &str = "https://ftp.nasdaqtrader.com/dynamic/SymDir/nasdaqlisted.txt";

/// 파일 마지막 줄 접두사
const FOOTER_PREFIX: &str = "File Creation Time";

/// NASDAQ Trader HTTP 종목 목록 제공자.
pub struct NasdaqListedProvider {
    client: reqwest::Client,
    url: String,
    include_test_issues: bool,
}

impl NasdaqListedProvider {
    /// 기본 URL, 30초 타임아웃으로 생성.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("nasdaq-loader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            url: NASDAQ_LISTED_URL.to_string(),
            include_test_issues: true,
        })
    }

    /// 조회 URL 변경 (미러, 테스트 서버).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// 테스트 종목(`Test Issue = Y`) 포함 여부.
    pub fn with_test_issues(mut self, include: bool) -> Self {
        self.include_test_issues = include;
        self
    }
}

#[async_trait]
impl SymbolListProvider for NasdaqListedProvider {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_symbols(&self) -> Result<Vec<SymbolListing>> {
        info!("NASDAQ 종목 목록 다운로드");

        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let listings = parse_nasdaq_listed(&body, self.include_test_issues)?;
        info!(count = listings.len(), "NASDAQ 종목 목록 조회 완료");

        Ok(listings)
    }
}

/// `nasdaqlisted.txt` 본문 파싱.
///
/// 원래 순서를 유지하며, 빈 심볼과 중복 심볼(첫 번째만 유지), 마지막 안내 줄을 제거합니다.
/// `Symbol` 헤더가 없거나 결과가 비어 있으면 오류입니다.
pub fn parse_nasdaq_listed(body: &str, include_test_issues: bool) -> Result<Vec<SymbolListing>> {
    let mut lines = body.lines().filter(|l| !l.trim().is_empty());

    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| DataError::ParseError("empty symbol directory".to_string()))?
        .split('|')
        .map(str::trim)
        .collect();

    let column = |name: &str| header.iter().position(|h| h.eq_ignore_ascii_case(name));
    let symbol_idx = column("Symbol")
        .ok_or_else(|| DataError::ParseError("missing 'Symbol' column".to_string()))?;
    let name_idx = column("Security Name");
    let test_idx = column("Test Issue");
    let etf_idx = column("ETF");

    let mut seen = HashSet::new();
    let mut listings = Vec::new();

    for line in lines {
        if line.starts_with(FOOTER_PREFIX) {
            continue;
        }

        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        let field = |idx: Option<usize>| idx.and_then(|i| fields.get(i).copied()).unwrap_or("");

        let raw_symbol = field(Some(symbol_idx));
        if raw_symbol.is_empty() {
            continue;
        }
        let symbol = match normalize_symbol(raw_symbol) {
            Ok(s) => s,
            Err(e) => {
                debug!(line = line, error = %e, "잘못된 심볼 행 건너뜀");
                continue;
            }
        };

        let test_issue = field(test_idx).eq_ignore_ascii_case("Y");
        if test_issue && !include_test_issues {
            continue;
        }
        if !seen.insert(symbol.clone()) {
            continue;
        }

        listings.push(SymbolListing {
            symbol,
            security_name: field(name_idx).to_string(),
            test_issue,
            etf: field(etf_idx).eq_ignore_ascii_case("Y"),
        });
    }

    if listings.is_empty() {
        return Err(DataError::ParseError(
            "symbol directory contains no symbols".to_string(),
        ));
    }

    Ok(listings)
}
