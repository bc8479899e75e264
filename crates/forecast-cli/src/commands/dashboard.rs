//! `dashboard` 명령: 대시보드를 한 번 갱신하고 패널을 출력.

use std::sync::Arc;

use forecast_analytics::Forecaster;
use forecast_api::{DashboardService, DashboardSnapshot};
use forecast_core::DashboardConfig;
use forecast_data::SeriesProvider;

use super::{to_json, OutputFormat};

/// 설정된 심볼 전체를 한 번 갱신합니다.
///
/// 심볼별 실패는 에러가 아니라 패널의 `error`로 남습니다.
pub async fn run_dashboard(
    provider: Arc<dyn SeriesProvider>,
    forecaster: Arc<dyn Forecaster>,
    config: DashboardConfig,
) -> anyhow::Result<DashboardSnapshot> {
    let service = DashboardService::new(provider, forecaster, config)?;
    Ok(service.refresh().await)
}

/// 스냅샷을 출력 문자열로 변환합니다.
pub fn render_dashboard(snapshot: &DashboardSnapshot, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return to_json(snapshot);
    }

    let mut out = format!(
        "\n대시보드 (세대 {}, 정확도 {:.1}% / {})\n",
        snapshot.generation, snapshot.accuracy, snapshot.accuracy_confidence
    );
    out.push_str("═══════════════════════════════════════════════════════\n");
    out.push_str(&format!(
        "  {:<8} | {:>10} | {:>10} | {:>8} | 비고\n",
        "심볼", "종가", "예측", "변화율"
    ));
    out.push_str("  ─────────────────────────────────────────────────────\n");

    for panel in &snapshot.panels {
        let fmt_price = |v: Option<f64>| v.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "-".into());
        let change = panel
            .change_percent
            .map(|c| format!("{:+.2}%", c))
            .unwrap_or_else(|| "-".into());
        let note = match (&panel.error, panel.using_fallback) {
            (Some(err), true) => format!("번들 데이터 표시 중: {}", err),
            (Some(err), false) => format!("이전 데이터 표시 중: {}", err),
            (None, _) => String::new(),
        };

        out.push_str(&format!(
            "  {:<8} | {:>10} | {:>10} | {:>8} | {}\n",
            panel.symbol,
            fmt_price(panel.last_price),
            fmt_price(panel.predicted),
            change,
            note
        ));
    }
    out.push_str("═══════════════════════════════════════════════════════\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_analytics::NaiveForecaster;
    use forecast_data::InMemoryProvider;

    #[tokio::test]
    async fn test_run_dashboard_with_failure() {
        let provider = Arc::new(InMemoryProvider::with_bundled());
        provider.set_failing("AAPL", true).await;

        let snapshot = run_dashboard(
            provider,
            Arc::new(NaiveForecaster::default()),
            DashboardConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(snapshot.generation, 1);
        assert!(snapshot.panels[0].error.is_some());
        assert!(snapshot.panels[0].using_fallback);
        assert!(snapshot.panels[1].error.is_none());

        let table = render_dashboard(&snapshot, OutputFormat::Table).unwrap();
        assert!(table.contains("번들 데이터 표시 중"));
        assert!(table.contains("NVDA"));
    }

    #[tokio::test]
    async fn test_blank_symbol_rejected() {
        let config = DashboardConfig {
            symbols: vec!["".to_string()],
            ..DashboardConfig::default()
        };
        let result = run_dashboard(
            Arc::new(InMemoryProvider::with_bundled()),
            Arc::new(NaiveForecaster::default()),
            config,
        )
        .await;
        assert!(result.is_err());
    }
}
