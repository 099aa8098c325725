//! 가격 조회 타임아웃 및 재시도 래퍼.
//!
//! 각 시도는 `request_timeout`으로 제한되며, 재시도 가능한 오류
//! (네트워크, 요청 한도 초과, 타임아웃)만 최대 `max_retries`회 다시 시도합니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use super::{FetchedBars, PriceProvider};
use crate::error::{DataError, Result};

/// 재시도 정책.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 최초 시도 이후 추가 재시도 횟수
    pub max_retries: u32,
    /// 시도당 타임아웃
    pub request_timeout: Duration,
    /// 백오프 기본 단위 (시도 횟수에 비례해 증가)
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            request_timeout: Duration::from_secs(30),
            base_delay: Duration::from_millis(500),
        }
    }
}

/// 타임아웃과 재시도를 적용하는 `PriceProvider` 래퍼.
pub struct RetryingPriceProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: PriceProvider> RetryingPriceProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    async fn attempt(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<FetchedBars> {
        match tokio::time::timeout(
            self.policy.request_timeout,
            self.inner.fetch_daily_bars(symbol, start, end),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(DataError::Timeout(format!(
                "{} after {:?}",
                symbol, self.policy.request_timeout
            ))),
        }
    }
}

#[async_trait]
impl<P: PriceProvider> PriceProvider for RetryingPriceProvider<P> {
    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchedBars> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            match self.attempt(symbol, start, end).await {
                Ok(fetched) => return Ok(fetched),
                Err(e) if e.is_retryable() && attempt <= self.policy.max_retries => {
                    let delay = e.retry_delay(self.policy.base_delay, attempt);
                    debug!(
                        symbol = symbol,
                        attempt = attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "일봉 조회 재시도 예정"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    if e.is_retryable() {
                        warn!(symbol = symbol, attempts = attempt, error = %e, "일봉 조회 최종 실패");
                    }
                    return Err(e);
                }
            }
        }
    }
}
