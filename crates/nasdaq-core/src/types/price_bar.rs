//! 일봉 가격 레코드.
//!
//! - `PriceBar` - 저장소에 기록되는 엄격한 일봉 레코드
//! - `RawBar` - 외부 가격 소스가 돌려주는 느슨한 형태의 응답 행
//!
//! 외부 응답은 경계에서 `RawBar::into_price_bar`로 검증된 뒤에만
//! 내부로 전달됩니다.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::BarValidationError;

/// 하루치 일봉 레코드.
///
/// (`symbol`, `date`) 쌍은 저장소 전체에서 유일합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 정규화된 심볼 (대문자)
    pub symbol: String,
    /// UTC 기준 거래일
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    /// 종가 (필수)
    pub close: f64,
    /// 수정 종가. 소스가 제공하지 않으면 `None`
    pub adj_close: Option<f64>,
    pub volume: Option<i64>,
}

impl PriceBar {
    /// 종가만으로 일봉을 생성합니다.
    pub fn new(symbol: impl Into<String>, date: NaiveDate, close: f64) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            open: None,
            high: None,
            low: None,
            close,
            adj_close: None,
            volume: None,
        }
    }

    /// 시가/고가/저가를 설정합니다.
    pub fn with_ohl(mut self, open: f64, high: f64, low: f64) -> Self {
        self.open = Some(open);
        self.high = Some(high);
        self.low = Some(low);
        self
    }

    /// 수정 종가를 설정합니다.
    pub fn with_adj_close(mut self, adj_close: f64) -> Self {
        self.adj_close = Some(adj_close);
        self
    }

    /// 거래량을 설정합니다.
    pub fn with_volume(mut self, volume: i64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// 외부 가격 소스의 원시 응답 행.
///
/// 모든 필드가 선택적이며, 유효하지 않은 값(NaN 등)을 포함할 수 있습니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBar {
    /// 봉 시작 시각 (unix 초)
    pub timestamp: Option<i64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<i64>,
}

impl RawBar {
    /// 원시 행을 검증하여 `PriceBar`로 변환합니다.
    ///
    /// 날짜와 종가는 필수이며, 음수 가격이 있으면 거부합니다.
    /// 유한하지 않은 선택 필드는 `None`으로 강제 변환됩니다.
    pub fn into_price_bar(self, symbol: &str) -> Result<PriceBar, BarValidationError> {
        let date = self
            .timestamp
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.date_naive())
            .ok_or(BarValidationError::MissingDate(self.timestamp))?;

        let close = finite(self.close).ok_or(BarValidationError::MissingClose(date))?;

        let open = finite(self.open);
        let high = finite(self.high);
        let low = finite(self.low);
        let adj_close = finite(self.adj_close);

        for (field, value) in [
            ("open", open),
            ("high", high),
            ("low", low),
            ("close", Some(close)),
            ("adj_close", adj_close),
        ] {
            if let Some(value) = value {
                if value < 0.0 {
                    return Err(BarValidationError::NegativePrice { field, value, date });
                }
            }
        }

        Ok(PriceBar {
            symbol: symbol.to_string(),
            date,
            open,
            high,
            low,
            close,
            adj_close,
            // 음수 거래량은 소스 오류로 보고 버립니다
            volume: self.volume.filter(|v| *v >= 0),
        })
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// 2010-01-04 14:30:00 UTC (미국 장 시작)
    const TS_2010_01_04: i64 = 1_262_615_400;

    fn raw() -> RawBar {
        RawBar {
            timestamp: Some(TS_2010_01_04),
            open: Some(10.0),
            high: Some(11.0),
            low: Some(9.5),
            close: Some(10.5),
            adj_close: Some(9.8),
            volume: Some(1_000),
        }
    }

    #[test]
    fn test_valid_raw_bar() {
        let bar = raw().into_price_bar("AAA").unwrap();
        assert_eq!(bar.symbol, "AAA");
        assert_eq!(bar.date, day(2010, 1, 4));
        assert_eq!(bar.close, 10.5);
        assert_eq!(bar.adj_close, Some(9.8));
        assert_eq!(bar.volume, Some(1_000));
    }

    #[test]
    fn test_missing_adj_close_is_null() {
        let bar = RawBar {
            adj_close: None,
            ..raw()
        }
        .into_price_bar("AAA")
        .unwrap();
        assert_eq!(bar.adj_close, None);

        let bar = RawBar {
            adj_close: Some(f64::NAN),
            ..raw()
        }
        .into_price_bar("AAA")
        .unwrap();
        assert_eq!(bar.adj_close, None);
    }

    #[test]
    fn test_missing_mandatory_fields_rejected() {
        let err = RawBar {
            timestamp: None,
            ..raw()
        }
        .into_price_bar("AAA")
        .unwrap_err();
        assert_eq!(err, BarValidationError::MissingDate(None));

        let err = RawBar {
            close: Some(f64::NAN),
            ..raw()
        }
        .into_price_bar("AAA")
        .unwrap_err();
        assert_eq!(err, BarValidationError::MissingClose(day(2010, 1, 4)));
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = RawBar {
            low: Some(-1.0),
            ..raw()
        }
        .into_price_bar("AAA")
        .unwrap_err();
        assert!(matches!(
            err,
            BarValidationError::NegativePrice { field: "low", .. }
        ));
    }

    #[test]
    fn test_negative_volume_dropped() {
        let bar = RawBar {
            volume: Some(-5),
            ..raw()
        }
        .into_price_bar("AAA")
        .unwrap();
        assert_eq!(bar.volume, None);
    }

    #[test]
    fn test_price_bar_serde() {
        let bar = PriceBar::new("AAA", day(2010, 1, 4), 10.5).with_volume(0);
        let json = serde_json::to_string(&bar).unwrap();
        assert!(json.contains("\"date\":\"2010-01-04\""));
        let back: PriceBar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bar);
    }
}
