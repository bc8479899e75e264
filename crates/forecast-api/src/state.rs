//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다.
//! 요청 간 공유 가변 상태는 대시보드 패널뿐입니다.

use std::sync::Arc;

use forecast_analytics::{Forecaster, PredictionSimulator};
use forecast_core::{DashboardConfig, ForecastResult};
use forecast_data::SeriesProvider;

use crate::services::DashboardService;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 시계열 제공자
    pub provider: Arc<dyn SeriesProvider>,

    /// 차트 시계열의 다음 기간 예측기
    pub forecaster: Arc<dyn Forecaster>,

    /// 시뮬레이션 예측 엔드포인트용 시뮬레이터
    pub simulator: PredictionSimulator,

    /// 대시보드 패널 갱신 서비스
    pub dashboard: Arc<DashboardService>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// 대시보드 심볼 설정이 잘못되었으면 에러를 반환합니다.
    pub fn new(
        provider: Arc<dyn SeriesProvider>,
        forecaster: Arc<dyn Forecaster>,
        dashboard_config: DashboardConfig,
    ) -> ForecastResult<Self> {
        let dashboard = DashboardService::new(provider.clone(), forecaster.clone(), dashboard_config)?;

        Ok(Self {
            simulator: PredictionSimulator::new(provider.clone()),
            provider,
            forecaster,
            dashboard: Arc::new(dashboard),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성.
///
/// 번들 AAPL/NVDA 데이터를 제공하는 메모리 제공자를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    create_test_state_with(Arc::new(forecast_data::InMemoryProvider::with_bundled()))
}

/// 주어진 제공자로 테스트용 AppState 생성.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with(provider: Arc<forecast_data::InMemoryProvider>) -> AppState {
    AppState::new(
        provider,
        Arc::new(forecast_analytics::NaiveForecaster::default()),
        DashboardConfig::default(),
    )
    .expect("default dashboard config is valid")
}
