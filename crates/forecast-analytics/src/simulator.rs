//! 예측 시뮬레이터.
//!
//! 최신 일봉 두 개를 조회한 뒤 고정 범위의 균등 난수로 예측값과
//! "모델 품질" 지표를 만들어냅니다. 지표들은 서로 독립된 난수에서 나오며
//! 예측값이나 학습된 모델과 아무 관계가 없습니다. 같은 심볼로 두 번 호출하면
//! 결과가 달라집니다.
//!
//! | 변형 | 예측 | R² | MSE |
//! |------|------|----|-----|
//! | 선형 회귀 | `cur × (1 + (U − 0.4) × 0.05)` | `0.87 + U × 0.08` | `2.0 + U × 3.0` |
//! | 랜덤 포레스트 | `cur × (1 + (U − 0.4) × 0.06)` | `0.91 + U × 0.07` | `1.5 + U × 2.0` |

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, info};

use forecast_core::{
    percent_change, Bar, Confidence, DecimalExt, ForecastError, ForecastResult, ModelType,
    PredictionInterval, PredictionResult, Symbol,
};
use forecast_data::{SeriesProvider, TimeSeriesRequest};

use crate::normalizer::MIN_POINTS;

/// 과거 예측 정확도 자리표시 값 (%).
///
/// 실제 백테스트 없이 대시보드 요약 카드에 표시되는 고정 값입니다.
pub const PLACEHOLDER_ACCURACY: f64 = 87.5;

/// 95% 구간의 z 값.
const Z_95: f64 = 1.96;

/// 변형별 난수 범위.
struct SimulationRanges {
    /// 예측 변화 스케일
    move_scale: f64,
    r_squared_base: f64,
    r_squared_span: f64,
    mse_base: f64,
    mse_span: f64,
}

impl SimulationRanges {
    fn for_model(model: ModelType) -> Self {
        match model {
            ModelType::LinearRegression => Self {
                move_scale: 0.05,
                r_squared_base: 0.87,
                r_squared_span: 0.08,
                mse_base: 2.0,
                mse_span: 3.0,
            },
            ModelType::RandomForest => Self {
                move_scale: 0.06,
                r_squared_base: 0.91,
                r_squared_span: 0.07,
                mse_base: 1.5,
                mse_span: 2.0,
            },
        }
    }
}

/// 시계열 제공자를 사용하는 예측 시뮬레이터.
#[derive(Clone)]
pub struct PredictionSimulator {
    provider: Arc<dyn SeriesProvider>,
}

impl PredictionSimulator {
    /// 새 시뮬레이터를 생성합니다.
    pub fn new(provider: Arc<dyn SeriesProvider>) -> Self {
        Self { provider }
    }

    /// 최신 일봉 두 개를 조회하고 엔트로피 기반 난수로 시뮬레이션합니다.
    pub async fn predict(&self, model: ModelType, symbol: &Symbol) -> ForecastResult<PredictionResult> {
        let bars = self.fetch_latest(symbol).await?;
        let mut rng = StdRng::from_entropy();
        simulate(model, symbol, &bars, &mut rng, Utc::now().date_naive())
    }

    /// 시드를 고정하여 시뮬레이션합니다 (재현 가능한 결과).
    pub async fn predict_seeded(
        &self,
        model: ModelType,
        symbol: &Symbol,
        seed: u64,
    ) -> ForecastResult<PredictionResult> {
        let bars = self.fetch_latest(symbol).await?;
        let mut rng = StdRng::seed_from_u64(seed);
        simulate(model, symbol, &bars, &mut rng, Utc::now().date_naive())
    }

    async fn fetch_latest(&self, symbol: &Symbol) -> ForecastResult<Vec<Bar>> {
        let request = TimeSeriesRequest::latest_daily_pair(symbol.clone());
        debug!(
            symbol = %symbol,
            provider = self.provider.name(),
            "시뮬레이션 입력 조회"
        );
        self.provider.fetch_bars(&request).await
    }
}

/// 제공자 datetime 원문 형태로 되돌립니다.
fn provider_datetime(ts: &NaiveDateTime) -> String {
    if ts.num_seconds_from_midnight() == 0 {
        ts.format("%Y-%m-%d").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// 캔들에서 예측 결과를 시뮬레이션합니다.
///
/// `bars`는 순서와 무관하며 가장 최신 두 개의 종가만 사용합니다.
/// `predictionDate`는 `today + 1일`입니다.
///
/// # Errors
///
/// 캔들이 두 개 미만이면 `InsufficientData`.
pub fn simulate<R: Rng>(
    model: ModelType,
    symbol: &Symbol,
    bars: &[Bar],
    rng: &mut R,
    today: NaiveDate,
) -> ForecastResult<PredictionResult> {
    if bars.len() < MIN_POINTS {
        return Err(ForecastError::InsufficientData {
            required: MIN_POINTS,
            actual: bars.len(),
        });
    }

    let mut newest: Vec<&Bar> = bars.iter().collect();
    newest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let latest = newest[0];
    let current = latest.close.to_f64_lossy();
    let previous = newest[1].close.to_f64_lossy();

    let ranges = SimulationRanges::for_model(model);
    let prediction = current * (1.0 + (rng.gen::<f64>() - 0.4) * ranges.move_scale);

    let mut result = PredictionResult {
        symbol: symbol.to_string(),
        last_actual_price: current,
        last_actual_date: provider_datetime(&latest.timestamp),
        prediction,
        prediction_date: (today + Duration::days(1)).format("%Y-%m-%d").to_string(),
        price_change_percent: percent_change(previous, current),
        prediction_change_percent: percent_change(current, prediction),
        confidence: Confidence::Low,
        r_squared: 0.0,
        mse: 0.0,
        risk_assessment: String::new(),
        model_type: model,
        prediction_interval: None,
        coefficient_of_variation: None,
        standard_deviation: None,
    };

    let confidence = match model {
        ModelType::LinearRegression => {
            result.r_squared = ranges.r_squared_base + rng.gen::<f64>() * ranges.r_squared_span;
            result.mse = ranges.mse_base + rng.gen::<f64>() * ranges.mse_span;
            Confidence::from_r_squared(result.r_squared)
        }
        ModelType::RandomForest => {
            let standard_deviation = current * 0.02 * (0.5 + rng.gen::<f64>());
            let cv = if prediction == 0.0 {
                0.0
            } else {
                standard_deviation / prediction.abs() * 100.0
            };
            let half_width = standard_deviation * Z_95;
            let lower = prediction - half_width;
            let upper = prediction + half_width;

            result.prediction_interval = Some(PredictionInterval {
                lower,
                upper,
                width: if prediction == 0.0 {
                    0.0
                } else {
                    (upper - lower) / prediction * 100.0
                },
            });
            result.coefficient_of_variation = Some(cv);
            result.standard_deviation = Some(standard_deviation);
            result.r_squared = ranges.r_squared_base + rng.gen::<f64>() * ranges.r_squared_span;
            result.mse = ranges.mse_base + rng.gen::<f64>() * ranges.mse_span;
            Confidence::from_coefficient_of_variation(cv)
        }
    };

    result.confidence = confidence;
    result.risk_assessment = confidence.risk_assessment(model).to_string();

    info!(
        symbol = %symbol,
        model = model.as_str(),
        prediction = result.prediction,
        confidence = confidence.as_str(),
        "예측 시뮬레이션 완료"
    );

    Ok(result)
}
