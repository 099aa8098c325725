//! 동기화 결과 통계.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 심볼별 조회 실패 기록.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolFailure {
    pub symbol: String,
    pub reason: String,
}

/// 한 번의 동기화 실행 결과.
///
/// `total = processed + skipped + failed.len()`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// 대상 심볼 수
    pub total: usize,
    /// 조회 성공 (데이터가 없었던 경우 포함)
    pub processed: usize,
    /// 건너뛴 심볼 (이미 최신 데이터)
    pub skipped: usize,
    /// 조회는 성공했지만 일봉이 없었던 심볼
    pub empty: usize,
    /// 조회 실패 심볼
    pub failed: Vec<SymbolFailure>,
    /// 새로 삽입된 행 수
    pub rows_inserted: u64,
    /// 검증 실패로 버려진 행 수
    pub rows_rejected: usize,
    /// 이번 실행에서 삽입된 가장 최근 일봉 날짜
    pub latest_bar_date: Option<NaiveDate>,
    /// 기록된 워터마크
    pub synced_at: Option<DateTime<Utc>>,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncReport {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 실패 심볼 기록
    pub fn record_failure(&mut self, symbol: impl Into<String>, reason: impl Into<String>) {
        self.failed.push(SymbolFailure {
            symbol: symbol.into(),
            reason: reason.into(),
        });
    }

    /// 삽입된 일봉의 최신 날짜 반영
    pub fn observe_bar_date(&mut self, date: NaiveDate) {
        if self.latest_bar_date.map_or(true, |d| date > d) {
            self.latest_bar_date = Some(date);
        }
    }

    /// 실패 심볼 수
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// 일부 심볼이 실패했는지 여부
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// 성공률 계산 (%), 건너뛴 심볼은 제외
    pub fn success_rate(&self) -> f64 {
        let attempted = self.processed + self.failed.len();
        if attempted == 0 {
            0.0
        } else {
            (self.processed as f64 / attempted as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            processed = self.processed,
            skipped = self.skipped,
            empty = self.empty,
            failed = self.failed.len(),
            rows_inserted = self.rows_inserted,
            rows_rejected = self.rows_rejected,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "동기화 완료"
        );

        for failure in &self.failed {
            tracing::warn!(symbol = %failure.symbol, reason = %failure.reason, "조회 실패 심볼");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_excludes_skipped() {
        let mut report = SyncReport::new();
        report.processed = 3;
        report.skipped = 10;
        report.record_failure("BBB", "timeout");

        assert_eq!(report.failed_count(), 1);
        assert!(report.has_failures());
        assert!((report.success_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_observe_bar_date_keeps_max() {
        let mut report = SyncReport::new();
        let d1 = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2020, 1, 3).unwrap();
        report.observe_bar_date(d2);
        report.observe_bar_date(d1);
        assert_eq!(report.latest_bar_date, Some(d2));
    }

    #[test]
    fn test_report_serializes_without_elapsed() {
        let report = SyncReport::new();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("elapsed").is_none());
        assert_eq!(json["rows_inserted"], 0);
    }
}
