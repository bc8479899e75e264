//! `predict` 명령: 시뮬레이션 예측 실행.

use std::sync::Arc;

use clap::ValueEnum;

use forecast_analytics::PredictionSimulator;
use forecast_core::{ModelType, PredictionResult, Symbol};
use forecast_data::SeriesProvider;

use super::{to_json, OutputFormat};

/// CLI 모델 선택지.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModelArg {
    /// 선형 회귀 시뮬레이션
    LinearRegression,
    /// 랜덤 포레스트 시뮬레이션 (예측 구간 포함)
    RandomForest,
}

impl From<ModelArg> for ModelType {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::LinearRegression => ModelType::LinearRegression,
            ModelArg::RandomForest => ModelType::RandomForest,
        }
    }
}

/// 최신 일봉 두 개로 시뮬레이션 예측을 실행합니다.
pub async fn run_predict(
    provider: Arc<dyn SeriesProvider>,
    symbol: &str,
    model: ModelArg,
    seed: Option<u64>,
) -> anyhow::Result<PredictionResult> {
    let symbol = Symbol::parse(symbol)?;
    let simulator = PredictionSimulator::new(provider);

    let result = match seed {
        Some(seed) => simulator.predict_seeded(model.into(), &symbol, seed).await?,
        None => simulator.predict(model.into(), &symbol).await?,
    };
    Ok(result)
}

/// 예측 결과를 출력 문자열로 변환합니다.
pub fn render_prediction(result: &PredictionResult, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return to_json(result);
    }

    let mut lines = vec![
        String::new(),
        format!("{} - {}", result.symbol, result.model_type.display_name()),
        "═══════════════════════════════════════".to_string(),
        format!(
            "  최신 종가   {:.2} ({}, {:+.2}%)",
            result.last_actual_price, result.last_actual_date, result.price_change_percent
        ),
        format!(
            "  예측 가격   {:.2} ({}, {:+.2}%)",
            result.prediction, result.prediction_date, result.prediction_change_percent
        ),
        format!("  신뢰도      {}", result.confidence),
        format!("  R²          {:.4}", result.r_squared),
        format!("  MSE         {:.4}", result.mse),
    ];
    if let Some(interval) = result.prediction_interval {
        lines.push(format!(
            "  예측 구간   {:.2} ~ {:.2} (폭 {:.2}%)",
            interval.lower, interval.upper, interval.width
        ));
    }
    if let Some(cv) = result.coefficient_of_variation {
        lines.push(format!("  변동계수    {:.2}%", cv));
    }
    lines.push(format!("  {}", result.risk_assessment));
    lines.push("  ※ 학습된 모델이 아닌 난수 시뮬레이션 결과입니다.".to_string());

    Ok(lines.join("\n") + "\n")
}
