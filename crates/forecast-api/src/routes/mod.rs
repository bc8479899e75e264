//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/series/{symbol}` - 차트 시계열 + 다음 기간 예측
//! - `/api/ml/linear-regression` - 선형 회귀 시뮬레이션
//! - `/api/ml/random-forest` - 랜덤 포레스트 시뮬레이션
//! - `/api/dashboard` - 대시보드 패널 스냅샷 및 갱신

pub mod dashboard;
pub mod health;
pub mod ml;
pub mod series;

pub use dashboard::dashboard_router;
pub use health::{health_router, HealthResponse};
pub use ml::{ml_router, PredictRequest};
pub use series::{series_router, SeriesQuery, SeriesResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/api/series", series_router())
        .nest("/api/ml", ml_router())
        .nest("/api/dashboard", dashboard_router())
}
