//! 대시보드 endpoint.
//!
//! - `GET /api/dashboard` - 현재 패널 스냅샷
//! - `POST /api/dashboard/refresh` - 즉시 갱신 후 스냅샷

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::services::DashboardSnapshot;
use crate::state::AppState;

/// 현재 대시보드 스냅샷.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "dashboard",
    responses(
        (status = 200, description = "패널 스냅샷", body = DashboardSnapshot)
    )
)]
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.snapshot().await)
}

/// 모든 심볼을 다시 조회합니다.
///
/// 심볼별 실패는 응답 실패가 아니라 해당 패널의 `error`로 표시됩니다.
#[utoipa::path(
    post,
    path = "/api/dashboard/refresh",
    tag = "dashboard",
    responses(
        (status = 200, description = "갱신된 패널 스냅샷", body = DashboardSnapshot)
    )
)]
pub async fn refresh_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.refresh().await)
}

/// 대시보드 라우터 생성.
pub fn dashboard_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_dashboard))
        .route("/refresh", post(refresh_dashboard))
}
