//! 로더 전반에서 사용되는 공통 타입.

mod price_bar;
mod symbol;

pub use price_bar::*;
pub use symbol::*;
