//! 동기화 메타데이터 (key/value).
//!
//! 실행 간에 유지되는 유일한 전역 상태는 워터마크입니다:
//! - `last_sync_timestamp` - 마지막으로 완료된 실행 시각 (RFC 3339, UTC)
//! - `latest_bar_date` - 지금까지 삽입된 가장 최근 일봉 날짜
//!
//! 이력은 남기지 않고 매번 덮어씁니다.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::SqlitePool;
use tracing::{debug, instrument};

use crate::error::{DataError, Result};
use nasdaq_core::parse_date;

/// 마지막 동기화 시각 키
pub const LAST_SYNC_TIMESTAMP_KEY: &str = "last_sync_timestamp";
/// 최신 일봉 날짜 키
pub const LATEST_BAR_DATE_KEY: &str = "latest_bar_date";

/// 메타데이터 저장소.
#[derive(Clone)]
pub struct MetadataRepository {
    pool: SqlitePool,
}

impl MetadataRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 값 조회.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(Option<String>,)> =
            sqlx::query_as("SELECT value FROM metadata WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.and_then(|(value,)| value))
    }

    /// 값 저장 (있으면 덮어씀).
    #[instrument(skip(self))]
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO metadata (key, value)
            VALUES (?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::InsertError(e.to_string()))?;
        Ok(())
    }

    /// 마지막 동기화 시각.
    pub async fn last_sync_timestamp(&self) -> Result<Option<DateTime<Utc>>> {
        self.get(LAST_SYNC_TIMESTAMP_KEY)
            .await?
            .map(|value| {
                DateTime::parse_from_rfc3339(&value)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| DataError::ParseError(format!("{}: {}", value, e)))
            })
            .transpose()
    }

    /// 마지막 동기화 시각 기록.
    pub async fn set_last_sync_timestamp(&self, at: DateTime<Utc>) -> Result<()> {
        self.set(
            LAST_SYNC_TIMESTAMP_KEY,
            &at.to_rfc3339_opts(SecondsFormat::Micros, true),
        )
        .await
    }

    /// 최신 일봉 날짜.
    pub async fn latest_bar_date(&self) -> Result<Option<NaiveDate>> {
        self.get(LATEST_BAR_DATE_KEY)
            .await?
            .map(|value| parse_date(&value).map_err(|e| DataError::ParseError(e.to_string())))
            .transpose()
    }

    /// 최신 일봉 날짜를 앞으로만 이동.
    ///
    /// 기존 값보다 늦은 날짜일 때만 기록하며, 기록 여부를 반환합니다.
    pub async fn advance_latest_bar_date(&self, date: NaiveDate) -> Result<bool> {
        // 읽을 수 없는 기존 값은 덮어씀
        let current = self.latest_bar_date().await.unwrap_or(None);
        if current.is_some_and(|c| c >= date) {
            return Ok(false);
        }

        self.set(LATEST_BAR_DATE_KEY, &date.format("%Y-%m-%d").to_string())
            .await?;
        debug!(date = %date, "최신 일봉 날짜 갱신");
        Ok(true)
    }
}
