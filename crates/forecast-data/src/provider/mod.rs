//! 시계열 제공자 모듈.
//!
//! ## 제공자
//! - `TwelveDataClient`: Twelve Data `time_series` REST API
//! - `InMemoryProvider`: 번들 데이터/테스트용 메모리 제공자 (`crate::fallback`)

pub mod twelve_data;

use async_trait::async_trait;
use forecast_core::{Bar, ForecastError, ForecastResult, Interval, Symbol};

pub use forecast_core::{MAX_OUTPUTSIZE, MIN_OUTPUTSIZE};
pub use twelve_data::TwelveDataClient;

/// 시계열 조회 요청.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSeriesRequest {
    /// 종목 심볼
    pub symbol: Symbol,
    /// 캔들 간격
    pub interval: Interval,
    /// 최신 캔들부터 가져올 개수
    pub outputsize: u32,
}

impl TimeSeriesRequest {
    /// 새 요청을 생성합니다.
    ///
    /// `outputsize`가 [`MIN_OUTPUTSIZE`]..=[`MAX_OUTPUTSIZE`] 범위를 벗어나면 `InvalidInput`.
    pub fn new(symbol: Symbol, interval: Interval, outputsize: u32) -> ForecastResult<Self> {
        if !(MIN_OUTPUTSIZE..=MAX_OUTPUTSIZE).contains(&outputsize) {
            return Err(ForecastError::InvalidInput(format!(
                "outputsize는 {}..={} 범위여야 합니다: {}",
                MIN_OUTPUTSIZE, MAX_OUTPUTSIZE, outputsize
            )));
        }
        Ok(Self {
            symbol,
            interval,
            outputsize,
        })
    }

    /// 최신 일봉 두 개 (시뮬레이터 입력).
    pub fn latest_daily_pair(symbol: Symbol) -> Self {
        Self {
            symbol,
            interval: Interval::Day1,
            outputsize: MIN_OUTPUTSIZE,
        }
    }
}

/// 시계열 제공자 trait.
///
/// 외부 데이터 소스에서 최신 캔들을 조회합니다.
/// 구현체는 요청 간 공유 가변 상태를 두지 않아야 합니다.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// 로깅용 제공자 이름.
    fn name(&self) -> &str;

    /// 최신 캔들 `request.outputsize`개를 제공자 순서(보통 최신순)로 반환합니다.
    ///
    /// # Errors
    ///
    /// - `ForecastError::DataUnavailable`: 제공자가 에러 상태 또는 빈 값 목록을 반환
    /// - `ForecastError::NetworkFailure`: 전송 실패 또는 비정상 HTTP 상태
    /// - `ForecastError::Parse`: 응답 형식 불일치
    async fn fetch_bars(&self, request: &TimeSeriesRequest) -> ForecastResult<Vec<Bar>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_single_bar() {
        let symbol = Symbol::parse("AAPL").unwrap();
        let err = TimeSeriesRequest::new(symbol, Interval::Day1, 1).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(_)));
    }

    #[test]
    fn test_latest_daily_pair() {
        let request = TimeSeriesRequest::latest_daily_pair(Symbol::parse("nvda").unwrap());
        assert_eq!(request.interval, Interval::Day1);
        assert_eq!(request.outputsize, 2);
        assert_eq!(request.symbol.as_str(), "NVDA");
    }
}
