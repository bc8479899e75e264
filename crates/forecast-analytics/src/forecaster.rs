//! 다음 기간 가격 예측.
//!
//! 현재 유일한 구현인 [`NaiveForecaster`]는 최근 변화율 평균을 외삽하고
//! 심볼별 고정 배율을 곱합니다. 통계 모델이 아니므로 실제 모델로 교체할 수 있도록
//! [`Forecaster`] trait 뒤에 둡니다.

use rust_decimal::Decimal;
use tracing::debug;

use forecast_core::{
    fractional_change, Bar, DecimalExt, ForecastConfig, ForecastError, ForecastResult, Interval,
    SeriesPoint, Symbol,
};

use crate::normalizer::{normalize, MIN_POINTS};

/// 다음 기간 예측기 trait.
pub trait Forecaster: Send + Sync {
    /// 로깅용 이름.
    fn name(&self) -> &str;

    /// 오래된 순 실제 포인트로부터 다음 기간 가격을 예측합니다.
    ///
    /// # Errors
    ///
    /// 실제 가격이 있는 포인트가 두 개 미만이면 `InsufficientData`.
    fn forecast(&self, symbol: &Symbol, history: &[SeriesPoint]) -> ForecastResult<Decimal>;
}

/// 최근 변화율 평균 외삽 예측기.
///
/// `예측 = 최신 종가 × (1 + 평균 변화율) × 배율`, 소수점 둘째 자리 반올림.
#[derive(Debug, Clone)]
pub struct NaiveForecaster {
    window: usize,
    designated_symbol: String,
    designated_multiplier: Decimal,
    default_multiplier: Decimal,
}

impl Default for NaiveForecaster {
    fn default() -> Self {
        Self::new(&ForecastConfig::default())
    }
}

impl NaiveForecaster {
    /// 설정에서 예측기를 생성합니다.
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            window: config.window.max(MIN_POINTS),
            designated_symbol: config.designated_symbol.trim().to_uppercase(),
            designated_multiplier: config.designated_multiplier,
            default_multiplier: config.default_multiplier,
        }
    }

    /// 평균 변화율 계산에 사용할 포인트 수 설정.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(MIN_POINTS);
        self
    }

    /// 배율 없이 동작하도록 설정합니다.
    pub fn without_multiplier(mut self) -> Self {
        self.designated_multiplier = Decimal::ONE;
        self.default_multiplier = Decimal::ONE;
        self
    }

    /// 심볼에 적용되는 배율.
    pub fn multiplier_for(&self, symbol: &Symbol) -> Decimal {
        if symbol.as_str() == self.designated_symbol {
            self.designated_multiplier
        } else {
            self.default_multiplier
        }
    }

    /// 최근 `window`개 포인트의 연속 변화율 평균.
    ///
    /// 직전 가격이 0인 구간은 건너뜁니다. 유효 구간이 없으면 0.
    fn average_change(recent: &[Decimal]) -> Decimal {
        let changes: Vec<Decimal> = recent
            .windows(2)
            .filter_map(|pair| fractional_change(pair[0], pair[1]))
            .collect();

        if changes.is_empty() {
            return Decimal::ZERO;
        }
        changes.iter().sum::<Decimal>() / Decimal::from(changes.len())
    }
}

impl Forecaster for NaiveForecaster {
    fn name(&self) -> &str {
        "naive_average_change"
    }

    fn forecast(&self, symbol: &Symbol, history: &[SeriesPoint]) -> ForecastResult<Decimal> {
        let actuals: Vec<Decimal> = history.iter().filter_map(|p| p.actual).collect();
        if actuals.len() < MIN_POINTS {
            return Err(ForecastError::InsufficientData {
                required: MIN_POINTS,
                actual: actuals.len(),
            });
        }

        let recent = &actuals[actuals.len().saturating_sub(self.window)..];
        let last = recent[recent.len() - 1];
        let average = Self::average_change(recent);
        let multiplier = self.multiplier_for(symbol);

        let forecast = (last * (Decimal::ONE + average) * multiplier).round_price(2);

        debug!(
            symbol = %symbol,
            points = recent.len(),
            average_change = %average,
            multiplier = %multiplier,
            forecast = %forecast,
            "단순 예측 계산"
        );

        Ok(forecast)
    }
}

/// 캔들을 정규화하고 마지막에 합성 예측 포인트를 붙입니다.
///
/// 결과 길이는 입력 길이 + 1이며 마지막 원소만 `forecast`를 가집니다.
pub fn build_chart_series(
    bars: &[Bar],
    symbol: &Symbol,
    interval: Interval,
    forecaster: &dyn Forecaster,
) -> ForecastResult<Vec<SeriesPoint>> {
    let mut series = normalize(bars, interval)?;
    let forecast = forecaster.forecast(symbol, &series)?;
    series.push(SeriesPoint::forecast(interval.forecast_label(), forecast));
    Ok(series)
}
