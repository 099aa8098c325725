//! SQLite 저장소.
//!
//! - `sqlite` - 연결 풀과 마이그레이션
//! - `prices` - 일봉 테이블 (삽입 전용, 기존 행은 갱신하지 않음)
//! - `metadata` - 프로세스 전역 key/value 레코드 (동기화 워터마크)

pub mod metadata;
pub mod prices;
pub mod sqlite;

pub use metadata::{MetadataRepository, LAST_SYNC_TIMESTAMP_KEY, LATEST_BAR_DATE_KEY};
pub use prices::{PriceRecord, PriceRepository};
pub use sqlite::{Database, DatabaseConfig};
