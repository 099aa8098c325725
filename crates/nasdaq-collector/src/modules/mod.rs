//! 동기화 모듈.

pub mod price_sync;
pub mod status;

pub use price_sync::{effective_start_date, sync_prices, SymbolPlan};
pub use status::{sync_status, SyncStatus};
