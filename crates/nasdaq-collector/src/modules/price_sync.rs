//! 일봉 증분 동기화 모듈.
//!
//! # 동작 흐름
//!
//! ```text
//! 종목 목록 조회 ──(실패 시 중단)──┐
//!         │                        ▼
//!         ▼                 SymbolListUnavailable
//! 심볼별 계획 (커서 조회, 순차)
//!         │
//!         ▼
//! 일봉 조회 (최대 concurrency개 동시, 저장소 접근 없음)
//!         │
//!         ▼
//! 결과 도착 순서대로 저장 (단일 writer, 심볼당 트랜잭션 1개)
//!         │
//!         ▼
//! 워터마크 기록 (모든 심볼 처리 후, 실패 여부와 무관)
//! ```

use std::time::Instant;

use chrono::{Days, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::PriceSyncConfig;
use crate::error::CollectorError;
use crate::{Result, SyncReport};
use nasdaq_data::{Database, PriceProvider, SymbolListProvider};

/// 심볼 하나의 조회 계획.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolPlan {
    pub symbol: String,
    /// 마지막 저장 날짜 (시작일 일괄 지정 시 조회하지 않음)
    pub cursor: Option<NaiveDate>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// 심볼의 조회 시작일 결정.
///
/// 우선순위: 일괄 지정 시작일 > 커서 다음 날 > 기본 시작일.
/// 커서 다음 날을 표현할 수 없으면 `None` (조회할 것이 없음).
pub fn effective_start_date(
    start_override: Option<NaiveDate>,
    cursor: Option<NaiveDate>,
    default_start: NaiveDate,
) -> Option<NaiveDate> {
    match (start_override, cursor) {
        (Some(start), _) => Some(start),
        (None, Some(cursor)) => cursor.checked_add_days(Days::new(1)),
        (None, None) => Some(default_start),
    }
}

/// 일봉 증분 동기화.
///
/// 심볼별 조회 실패는 `SyncReport::failed`에 기록하고 다음 심볼로 넘어갑니다.
/// 종목 목록 조회 실패와 저장소 에러만 실행을 중단시킵니다.
pub async fn sync_prices(
    db: &Database,
    symbol_source: &dyn SymbolListProvider,
    price_source: &dyn PriceProvider,
    config: &PriceSyncConfig,
) -> Result<SyncReport> {
    let started = Instant::now();
    let mut report = SyncReport::new();

    info!("일봉 동기화 시작");

    // 1. 종목 목록
    let mut listings = symbol_source
        .fetch_symbols()
        .await
        .map_err(CollectorError::SymbolListUnavailable)?;

    if let Some(limit) = config.symbol_limit {
        listings.truncate(limit);
    }

    let end = config.end_date.unwrap_or_else(|| Utc::now().date_naive());
    info!(
        symbols = listings.len(),
        start_override = ?config.start_date,
        end_date = %end,
        "수집 범위 설정 완료"
    );

    // 2. 심볼별 계획 (커서는 저장소에서 매번 다시 계산)
    let prices = db.prices();
    let mut plans = Vec::with_capacity(listings.len());

    for listing in listings {
        report.total += 1;

        let cursor = match config.start_date {
            Some(_) => None,
            None => prices
                .latest_date(&listing.symbol)
                .await
                .map_err(CollectorError::Store)?,
        };

        match effective_start_date(config.start_date, cursor, config.default_start_date) {
            Some(start) if start <= end => plans.push(SymbolPlan {
                symbol: listing.symbol,
                cursor,
                start,
                end,
            }),
            _ => {
                report.skipped += 1;
                debug!(symbol = %listing.symbol, cursor = ?cursor, "이미 최신 데이터");
            }
        }
    }

    // 3. 조회는 병렬, 저장은 이 루프 하나에서만
    let planned = plans.len();
    let delay = config.request_delay();
    let mut results = stream::iter(plans)
        .map(|plan| async move {
            let result = price_source
                .fetch_daily_bars(&plan.symbol, plan.start, plan.end)
                .await;
            // Rate limiting
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            (plan, result)
        })
        .buffer_unordered(config.concurrency.max(1));

    let mut done = 0;
    while let Some((plan, result)) = results.next().await {
        done += 1;
        let progress = format!("{}/{}", done, planned);

        match result {
            Ok(fetched) => {
                report.processed += 1;
                report.rows_rejected += fetched.rejected;

                if fetched.is_empty() {
                    report.empty += 1;
                    debug!(symbol = %plan.symbol, progress = %progress, "데이터 없음");
                    continue;
                }

                let inserted = prices
                    .insert_bars(&fetched.bars)
                    .await
                    .map_err(CollectorError::StoreWriteFailed)?;
                report.rows_inserted += inserted;

                if inserted > 0 {
                    if let Some(date) = fetched.max_date() {
                        report.observe_bar_date(date);
                    }
                }

                info!(
                    symbol = %plan.symbol,
                    progress = %progress,
                    start = %plan.start,
                    fetched = fetched.bars.len(),
                    inserted = inserted,
                    "저장 완료"
                );
            }
            Err(e) => {
                warn!(symbol = %plan.symbol, progress = %progress, error = %e, "조회 실패");
                report.record_failure(plan.symbol, e.to_string());
            }
        }
    }
    drop(results);

    // 4. 워터마크 (모든 심볼 처리 후)
    let metadata = db.metadata();
    let now = Utc::now();
    metadata
        .set_last_sync_timestamp(now)
        .await
        .map_err(CollectorError::StoreWriteFailed)?;

    if let Some(date) = report.latest_bar_date {
        metadata
            .advance_latest_bar_date(date)
            .await
            .map_err(CollectorError::StoreWriteFailed)?;
    }

    report.synced_at = Some(now);
    report.elapsed = started.elapsed();
    Ok(report)
}
