//! 동기화 상태 조회.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::CollectorError;
use crate::Result;
use nasdaq_data::Database;

/// 저장소의 현재 동기화 상태.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStatus {
    /// 마지막으로 완료된 실행 시각
    pub last_sync_timestamp: Option<DateTime<Utc>>,
    /// 저장된 가장 최근 일봉 날짜
    pub latest_bar_date: Option<NaiveDate>,
    /// 전체 행 수
    pub total_rows: i64,
    /// 심볼 수
    pub symbol_count: i64,
}

/// 워터마크와 행 수 조회.
pub async fn sync_status(db: &Database) -> Result<SyncStatus> {
    let metadata = db.metadata();
    let prices = db.prices();

    Ok(SyncStatus {
        last_sync_timestamp: metadata
            .last_sync_timestamp()
            .await
            .map_err(CollectorError::Store)?,
        latest_bar_date: metadata
            .latest_bar_date()
            .await
            .map_err(CollectorError::Store)?,
        total_rows: prices.count_rows().await.map_err(CollectorError::Store)?,
        symbol_count: prices.count_symbols().await.map_err(CollectorError::Store)?,
    })
}

impl SyncStatus {
    /// 상태 로그 출력
    pub fn log(&self) {
        tracing::info!(
            last_sync = ?self.last_sync_timestamp,
            latest_bar_date = ?self.latest_bar_date,
            total_rows = self.total_rows,
            symbols = self.symbol_count,
            "동기화 상태"
        );
    }
}
