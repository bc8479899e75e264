//! CLI 명령 구현.

pub mod dashboard;
pub mod predict;
pub mod series;

pub use dashboard::{render_dashboard, run_dashboard};
pub use predict::{render_prediction, run_predict, ModelArg};
pub use series::{render_series, run_series, SeriesReport};

use std::sync::Arc;

use anyhow::Context;
use clap::ValueEnum;
use tracing::info;

use forecast_core::ProviderConfig;
use forecast_data::{InMemoryProvider, SeriesProvider, TwelveDataClient};

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// 사람이 읽기 쉬운 표
    #[default]
    Table,
    /// JSON (API 응답과 같은 필드명)
    Json,
}

/// 시계열 제공자 생성.
///
/// `offline`이면 네트워크 없이 번들 AAPL/NVDA 데이터만 사용합니다.
pub fn build_provider(
    config: &ProviderConfig,
    offline: bool,
) -> anyhow::Result<Arc<dyn SeriesProvider>> {
    if offline {
        info!("오프라인 모드: 번들 데이터 사용");
        return Ok(Arc::new(InMemoryProvider::with_bundled()));
    }

    let client = TwelveDataClient::new(config).context("Twelve Data 클라이언트 생성 실패")?;
    Ok(Arc::new(client))
}

/// 값을 출력 형식에 맞게 JSON 문자열로 직렬화합니다.
pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("JSON 직렬화 실패")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_provider_is_in_memory() {
        let provider = build_provider(&ProviderConfig::default(), true).unwrap();
        assert_eq!(provider.name(), "in_memory");
    }
}
