//! `series` 명령: 차트 시계열과 다음 기간 예측 출력.

use serde::Serialize;
use tracing::{debug, Instrument};

use forecast_analytics::{build_chart_series, Forecaster};
use forecast_core::{
    latest_actual_and_forecast, percent_change, series_span, DecimalExt, ForecastError, Interval,
    SeriesPoint, Symbol,
};
use forecast_data::{SeriesProvider, TimeSeriesRequest};

use super::{to_json, OutputFormat};

/// 시계열 조회 결과.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesReport {
    pub symbol: Symbol,
    pub interval: Interval,
    pub series: Vec<SeriesPoint>,
    pub last_price: f64,
    pub predicted: f64,
    pub change_percent: f64,
}

/// 제공자에서 캔들을 받아 차트 시계열을 만듭니다.
pub async fn run_series(
    provider: &dyn SeriesProvider,
    forecaster: &dyn Forecaster,
    symbol: &str,
    interval: &str,
    outputsize: u32,
) -> anyhow::Result<SeriesReport> {
    let symbol = Symbol::parse(symbol)?;
    let interval: Interval = interval.parse().map_err(ForecastError::InvalidInput)?;
    let request = TimeSeriesRequest::new(symbol.clone(), interval, outputsize)?;

    let span = series_span!("cli_series", symbol, interval);
    let bars = provider.fetch_bars(&request).instrument(span).await?;
    let series = build_chart_series(&bars, &symbol, interval, forecaster)?;

    let (last, forecast) = latest_actual_and_forecast(&series)
        .ok_or_else(|| ForecastError::Internal("예측 포인트 누락".to_string()))?;
    let last_price = last.to_f64_lossy();
    let predicted = forecast.to_f64_lossy();
    debug!(points = series.len(), predicted, "시계열 생성 완료");

    Ok(SeriesReport {
        symbol,
        interval,
        series,
        last_price,
        predicted,
        change_percent: percent_change(last_price, predicted),
    })
}

/// 시계열 결과를 출력 문자열로 변환합니다.
pub fn render_series(report: &SeriesReport, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let mut out = String::new();
    out.push_str(&format!("\n{} ({})\n", report.symbol, report.interval));
    out.push_str("═══════════════════════════════════════\n");
    out.push_str(&format!("  {:<20} | {:>10} | {:>10}\n", "기간", "실제", "예측"));
    out.push_str("  ─────────────────────────────────────\n");
    for point in &report.series {
        let actual = point.actual.map(|v| v.to_string()).unwrap_or_default();
        let forecast = point.forecast.map(|v| v.to_string()).unwrap_or_default();
        out.push_str(&format!(
            "  {:<20} | {:>10} | {:>10}\n",
            point.label, actual, forecast
        ));
    }
    out.push_str("═══════════════════════════════════════\n");
    out.push_str(&format!(
        "  최신 종가 {:.2} → 예측 {:.2} ({:+.2}%)\n",
        report.last_price, report.predicted, report.change_percent
    ));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_analytics::NaiveForecaster;
    use forecast_data::InMemoryProvider;

    #[tokio::test]
    async fn test_run_series_bundled() {
        let provider = InMemoryProvider::with_bundled();
        let report = run_series(&provider, &NaiveForecaster::default(), "aapl", "1month", 12)
            .await
            .unwrap();

        assert_eq!(report.symbol.as_str(), "AAPL");
        assert_eq!(report.series.len(), 13);
        assert!(report.series.last().unwrap().is_forecast());
        assert!((report.last_price - 206.86).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_run_series_rejects_bad_interval() {
        let provider = InMemoryProvider::with_bundled();
        let err = run_series(&provider, &NaiveForecaster::default(), "AAPL", "1year", 12)
            .await
            .unwrap_err();
        let err = err.downcast::<ForecastError>().unwrap();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_render_table_and_json() {
        let provider = InMemoryProvider::with_bundled();
        let report = run_series(&provider, &NaiveForecaster::default(), "NVDA", "1month", 4)
            .await
            .unwrap();

        let table = render_series(&report, OutputFormat::Table).unwrap();
        assert!(table.contains("NVDA (1month)"));
        assert!(table.contains("Next Month (Pred)"));

        let json: serde_json::Value =
            serde_json::from_str(&render_series(&report, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["symbol"], "NVDA");
        assert_eq!(json["series"].as_array().unwrap().len(), 5);
    }
}
