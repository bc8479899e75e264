//! 시계열 데이터 조회.
//!
//! 이 crate는 다음을 제공합니다:
//! - 제공자 중립적인 [`SeriesProvider`] trait
//! - Twelve Data REST API 클라이언트 ([`TwelveDataClient`])
//! - 번들된 대체(fallback) 시계열과 메모리 기반 제공자
//!
//! 어떤 호출도 재시도하지 않습니다. 실패는 `ForecastError`로 호출자에게 전달됩니다.

pub mod fallback;
pub mod provider;

pub use fallback::{bundled_bars, bundled_series, InMemoryProvider};
pub use provider::{SeriesProvider, TimeSeriesRequest, TwelveDataClient};
