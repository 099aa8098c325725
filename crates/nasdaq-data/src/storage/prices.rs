//! 일봉 테이블 저장소.
//!
//! (`symbol`, `date`)가 기본 키이며, 삽입은 `INSERT OR IGNORE`로 수행합니다.
//! 이미 저장된 행은 이후 조회 구간이 겹쳐도 덮어쓰지 않습니다.

use chrono::NaiveDate;
use sqlx::sqlite::SqlitePool;
use sqlx::FromRow;
use tracing::{debug, instrument};

use crate::error::{DataError, Result};
use nasdaq_core::{parse_date, PriceBar};

/// 저장 날짜 형식
const DATE_FORMAT: &str = "%Y-%m-%d";

/// 일봉 데이터베이스 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct PriceRecord {
    pub symbol: String,
    pub date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<i64>,
}

impl PriceRecord {
    /// PriceBar 도메인 객체로 변환.
    pub fn to_price_bar(&self) -> Result<PriceBar> {
        let date = parse_date(&self.date).map_err(|e| DataError::ParseError(e.to_string()))?;
        let close = self.close.ok_or_else(|| {
            DataError::ParseError(format!("{} {}: close is NULL", self.symbol, self.date))
        })?;

        Ok(PriceBar {
            symbol: self.symbol.clone(),
            date,
            open: self.open,
            high: self.high,
            low: self.low,
            close,
            adj_close: self.adj_close,
            volume: self.volume,
        })
    }
}

/// 일봉 저장소.
#[derive(Clone)]
pub struct PriceRepository {
    pool: SqlitePool,
}

impl PriceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 심볼의 가장 최근 저장 날짜 (동기화 커서).
    #[instrument(skip(self))]
    pub async fn latest_date(&self, symbol: &str) -> Result<Option<NaiveDate>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT date FROM prices WHERE symbol = ? ORDER BY date DESC LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(date,)| parse_date(&date).map_err(|e| DataError::ParseError(e.to_string())))
            .transpose()
    }

    /// 일봉 일괄 삽입 (이미 있는 (symbol, date)는 건너뜀).
    ///
    /// 하나의 트랜잭션으로 처리하며, 실제로 삽입된 행 수를 반환합니다.
    #[instrument(skip(self, bars), fields(count = bars.len()))]
    pub async fn insert_bars(&self, bars: &[PriceBar]) -> Result<u64> {
        if bars.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;
        let mut inserted = 0;

        for bar in bars {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO prices (symbol, date, open, high, low, close, adj_close, volume)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&bar.symbol)
            .bind(bar.date.format(DATE_FORMAT).to_string())
            .bind(bar.open)
            .bind(bar.high)
            .bind(bar.low)
            .bind(bar.close)
            .bind(bar.adj_close)
            .bind(bar.volume)
            .execute(&mut *tx)
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

        debug!(inserted = inserted, "일봉 저장 완료");
        Ok(inserted)
    }

    /// 심볼의 전체 일봉 (날짜 오름차순).
    pub async fn bars_for(&self, symbol: &str) -> Result<Vec<PriceBar>> {
        let records: Vec<PriceRecord> = sqlx::query_as(
            r#"
            SELECT symbol, date, open, high, low, close, adj_close, volume
            FROM prices
            WHERE symbol = ?
            ORDER BY date ASC
            "#,
        )
        .bind(symbol)
        .fetch_all(&self.pool)
        .await?;

        records.iter().map(PriceRecord::to_price_bar).collect()
    }

    /// 전체 행 수.
    pub async fn count_rows(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prices")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// 저장된 심볼 수.
    pub async fn count_symbols(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT symbol) FROM prices")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// (symbol, date) 중복 그룹 수. 기본 키가 있으므로 항상 0이어야 합니다.
    pub async fn count_duplicate_keys(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM (
                SELECT symbol, date FROM prices
                GROUP BY symbol, date
                HAVING COUNT(*) > 1
            )
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
