//! 번들된 대체 시계열과 메모리 기반 제공자.
//!
//! 외부 제공자를 사용할 수 없을 때 대시보드가 보여줄 고정 데이터입니다.
//! 2023년 6월 ~ 2024년 5월 월봉 종가와 미리 계산된 다음 달 예측값을 포함합니다.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::debug;

use forecast_core::{Bar, ForecastError, ForecastResult, Interval, SeriesPoint};

use crate::provider::{SeriesProvider, TimeSeriesRequest};

/// 번들 데이터 시작 월.
const BUNDLE_START: (i32, u32) = (2023, 6);

const AAPL_CLOSES: [Decimal; 12] = [
    dec!(190.68),
    dec!(196.45),
    dec!(187.87),
    dec!(192.53),
    dec!(170.77),
    dec!(189.95),
    dec!(193.58),
    dec!(185.85),
    dec!(182.52),
    dec!(169.00),
    dec!(183.12),
    dec!(206.86),
];
const AAPL_FORECAST: Decimal = dec!(210.58);

const NVDA_CLOSES: [Decimal; 12] = [
    dec!(125.85),
    dec!(139.50),
    dec!(112.30),
    dec!(121.80),
    dec!(132.65),
    dec!(145.75),
    dec!(152.50),
    dec!(143.20),
    dec!(125.40),
    dec!(103.75),
    dec!(118.25),
    dec!(134.38),
];
const NVDA_FORECAST: Decimal = dec!(138.95);

/// 번들 데이터가 있는 심볼 목록.
pub const BUNDLED_SYMBOLS: [&str; 2] = ["AAPL", "NVDA"];

fn bundle_for(symbol: &str) -> Option<(&'static [Decimal; 12], Decimal)> {
    match symbol.trim().to_uppercase().as_str() {
        "AAPL" => Some((&AAPL_CLOSES, AAPL_FORECAST)),
        "NVDA" => Some((&NVDA_CLOSES, NVDA_FORECAST)),
        _ => None,
    }
}

/// `BUNDLE_START`부터 `offset`개월 뒤의 월초 시각.
fn month_start(offset: u32) -> Option<NaiveDateTime> {
    let (year, month) = BUNDLE_START;
    let zero_based = month - 1 + offset;
    NaiveDate::from_ymd_opt(year + (zero_based / 12) as i32, zero_based % 12 + 1, 1)?
        .and_hms_opt(0, 0, 0)
}

/// 번들 월봉 캔들을 제공자 순서(최신순)로 반환합니다.
pub fn bundled_bars(symbol: &str) -> Option<Vec<Bar>> {
    let (closes, _) = bundle_for(symbol)?;
    let mut bars = closes
        .iter()
        .enumerate()
        .map(|(i, close)| month_start(i as u32).map(|ts| Bar::from_close(ts, *close)))
        .collect::<Option<Vec<_>>>()?;
    bars.reverse();
    Some(bars)
}

/// 번들 차트 시계열 (오래된 순, 마지막에 예측 포인트).
pub fn bundled_series(symbol: &str) -> Option<Vec<SeriesPoint>> {
    let (_, forecast) = bundle_for(symbol)?;
    let interval = Interval::Month1;
    let mut series: Vec<SeriesPoint> = bundled_bars(symbol)?
        .into_iter()
        .rev()
        .map(|bar| SeriesPoint::actual(interval.format_label(&bar.timestamp), bar.timestamp, bar.close))
        .collect();
    series.push(SeriesPoint::forecast(interval.forecast_label(), forecast));
    Some(series)
}

/// 메모리 기반 시계열 제공자.
///
/// 오프라인 CLI 실행과 테스트에서 사용합니다. 심볼별로 실패를 주입할 수 있습니다.
#[derive(Default)]
pub struct InMemoryProvider {
    bars: RwLock<HashMap<String, Vec<Bar>>>,
    failing: RwLock<HashSet<String>>,
}

impl InMemoryProvider {
    /// 빈 제공자.
    pub fn new() -> Self {
        Self::default()
    }

    /// 번들 AAPL/NVDA 데이터를 담은 제공자.
    pub fn with_bundled() -> Self {
        let mut bars = HashMap::new();
        for symbol in BUNDLED_SYMBOLS {
            if let Some(series) = bundled_bars(symbol) {
                bars.insert(symbol.to_string(), series);
            }
        }
        Self {
            bars: RwLock::new(bars),
            failing: RwLock::new(HashSet::new()),
        }
    }

    /// 심볼의 캔들을 설정합니다 (최신순).
    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.bars.get_mut().insert(symbol.to_uppercase(), bars);
        self
    }

    /// 심볼의 캔들을 교체합니다.
    pub async fn insert(&self, symbol: &str, bars: Vec<Bar>) {
        self.bars.write().await.insert(symbol.to_uppercase(), bars);
    }

    /// 심볼 조회가 네트워크 실패를 반환하도록 설정하거나 해제합니다.
    pub async fn set_failing(&self, symbol: &str, failing: bool) {
        let mut set = self.failing.write().await;
        if failing {
            set.insert(symbol.to_uppercase());
        } else {
            set.remove(&symbol.to_uppercase());
        }
    }
}

#[async_trait]
impl SeriesProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn fetch_bars(&self, request: &TimeSeriesRequest) -> ForecastResult<Vec<Bar>> {
        let symbol = request.symbol.as_str();

        if self.failing.read().await.contains(symbol) {
            return Err(ForecastError::NetworkFailure(format!(
                "simulated failure for {}",
                symbol
            )));
        }

        let bars = self.bars.read().await;
        let series = bars
            .get(symbol)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| ForecastError::DataUnavailable(format!("No data for {}", symbol)))?;

        let take = (request.outputsize as usize).min(series.len());
        debug!(symbol, count = take, "메모리 제공자 응답");
        Ok(series[..take].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::Symbol;

    fn request(symbol: &str, outputsize: u32) -> TimeSeriesRequest {
        TimeSeriesRequest::new(Symbol::parse(symbol).unwrap(), Interval::Month1, outputsize).unwrap()
    }

    #[test]
    fn test_bundled_bars_newest_first() {
        let bars = bundled_bars("AAPL").unwrap();
        assert_eq!(bars.len(), 12);
        assert_eq!(bars[0].close, dec!(206.86));
        assert_eq!(bars[0].timestamp.format("%Y-%m").to_string(), "2024-05");
        assert_eq!(bars[11].close, dec!(190.68));
        assert_eq!(bars[11].timestamp.format("%Y-%m").to_string(), "2023-06");
        assert!(bundled_bars("MSFT").is_none());
    }

    #[test]
    fn test_bundled_series_shape() {
        let series = bundled_series("nvda").unwrap();
        assert_eq!(series.len(), 13);
        assert_eq!(series[0].label, "Jun 2023");
        assert_eq!(series[0].actual, Some(dec!(125.85)));
        assert_eq!(series[11].label, "May 2024");
        assert_eq!(series[11].actual, Some(dec!(134.38)));

        let last = series.last().unwrap();
        assert!(last.is_forecast());
        assert_eq!(last.label, "Next Month (Pred)");
        assert_eq!(last.forecast, Some(dec!(138.95)));
    }

    #[tokio::test]
    async fn test_in_memory_truncates_to_outputsize() {
        let provider = InMemoryProvider::with_bundled();
        let bars = provider.fetch_bars(&request("AAPL", 2)).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, dec!(206.86));
        assert_eq!(bars[1].close, dec!(183.12));
    }

    #[tokio::test]
    async fn test_in_memory_unknown_symbol() {
        let provider = InMemoryProvider::with_bundled();
        let err = provider.fetch_bars(&request("MSFT", 12)).await.unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_in_memory_injected_failure() {
        let provider = InMemoryProvider::with_bundled();
        provider.set_failing("aapl", true).await;
        let err = provider.fetch_bars(&request("AAPL", 12)).await.unwrap_err();
        assert!(matches!(err, ForecastError::NetworkFailure(_)));

        provider.set_failing("AAPL", false).await;
        assert!(provider.fetch_bars(&request("AAPL", 12)).await.is_ok());
    }

    #[tokio::test]
    async fn test_with_bars_builder() {
        let ts = month_start(0).unwrap();
        let provider = InMemoryProvider::new().with_bars("tsla", vec![Bar::from_close(ts, dec!(1))]);
        provider.insert("MSFT", vec![]).await;
        let err = provider.fetch_bars(&request("MSFT", 2)).await.unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable(_)));
        let bars = provider.fetch_bars(&request("TSLA", 2)).await.unwrap();
        assert_eq!(bars.len(), 1);
    }
}
