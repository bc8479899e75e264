//! OpenAPI 문서화 설정.
//!
//! utoipa로 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 엔드포인트를 추가할 때는 핸들러에 `#[utoipa::path(...)]`를 달고
//! 이 파일의 `paths(...)`와 `components(schemas(...))`에 등록합니다.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use forecast_core::{
    Confidence, Interval, ModelType, PredictionInterval, PredictionResult, SeriesPoint,
};

use crate::error::ApiErrorResponse;
use crate::routes::{HealthResponse, PredictRequest, SeriesResponse};
use crate::services::{DashboardSnapshot, PanelSnapshot};

/// Forecast API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stock Forecast API",
        version = "0.1.0",
        description = r#"
# 주가 예측 대시보드 REST API

월별 종가 차트와 다음 기간 예측, 시뮬레이션 모델 예측을 제공합니다.

## 주의

`/api/ml/*` 응답은 학습된 모델이 아닌 난수 기반 시뮬레이션입니다.
요청마다 값이 달라지며 `seed`를 지정하면 재현됩니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "series", description = "시계열 - 차트 포인트 및 다음 기간 예측"),
        (name = "ml", description = "ML - 시뮬레이션 예측"),
        (name = "dashboard", description = "대시보드 - 종목별 패널 스냅샷")
    ),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,

            // ===== Common =====
            ApiErrorResponse,
            Interval,
            SeriesPoint,

            // ===== Series =====
            SeriesResponse,

            // ===== ML =====
            PredictRequest,
            PredictionResult,
            PredictionInterval,
            ModelType,
            Confidence,

            // ===== Dashboard =====
            DashboardSnapshot,
            PanelSnapshot,
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,
        crate::routes::series::get_series,
        crate::routes::ml::predict_linear_regression,
        crate::routes::ml::predict_random_forest,
        crate::routes::dashboard::get_dashboard,
        crate::routes::dashboard::refresh_dashboard,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
