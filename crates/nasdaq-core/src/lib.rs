//! # NASDAQ Core
//!
//! NASDAQ 일봉 가격 로더의 핵심 도메인 타입을 제공합니다.
//!
//! - 일봉 레코드(`PriceBar`)와 외부 응답 경계 타입(`RawBar`)
//! - 심볼 정규화 및 Yahoo 심볼 변환
//! - 로깅 인프라

pub mod error;
pub mod logging;
pub mod types;

pub use error::*;
pub use logging::*;
pub use types::*;
