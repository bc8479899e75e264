//! 예측 대시보드의 도메인 모델.

mod bar;
mod prediction;
mod series;

pub use bar::*;
pub use prediction::*;
pub use series::*;
