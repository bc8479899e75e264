//! 시뮬레이션 예측 endpoint.
//!
//! # 주의
//!
//! 이 엔드포인트는 학습된 모델을 호출하지 않습니다. 최신 종가 두 개에
//! 고정 범위 난수를 적용한 결과이며 호출마다 값이 달라집니다.
//! 실제 모델로 교체하면 모든 수치 출력이 바뀝니다.
//!
//! - `POST /api/ml/linear-regression`
//! - `POST /api/ml/random-forest`

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use forecast_core::{ModelType, PredictionResult, Symbol};

use crate::error::{forecast_error, json_rejection, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 예측 요청.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// 종목 심볼 (필수)
    #[serde(default)]
    pub symbol: Option<String>,
    /// 난수 시드 (지정하면 같은 입력에 같은 결과)
    #[serde(default)]
    pub seed: Option<u64>,
}

async fn run_prediction(
    state: &AppState,
    model: ModelType,
    request: PredictRequest,
) -> ApiResult<Json<PredictionResult>> {
    let symbol = Symbol::from_optional(request.symbol.as_deref()).map_err(forecast_error)?;

    info!(symbol = %symbol, model = model.as_str(), "예측 요청");

    let result = match request.seed {
        Some(seed) => state.simulator.predict_seeded(model, &symbol, seed).await,
        None => state.simulator.predict(model, &symbol).await,
    }
    .map_err(forecast_error)?;

    Ok(Json(result))
}

/// 선형 회귀 시뮬레이션.
#[utoipa::path(
    post,
    path = "/api/ml/linear-regression",
    tag = "ml",
    request_body = PredictRequest,
    responses(
        (status = 200, description = "시뮬레이션 예측", body = PredictionResult),
        (status = 400, description = "심볼 누락 또는 잘못된 본문", body = ApiErrorResponse),
        (status = 500, description = "데이터 조회 또는 계산 실패", body = ApiErrorResponse)
    )
)]
pub async fn predict_linear_regression(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> ApiResult<Json<PredictionResult>> {
    let Json(request) = payload.map_err(json_rejection)?;
    run_prediction(&state, ModelType::LinearRegression, request).await
}

/// 랜덤 포레스트 시뮬레이션.
#[utoipa::path(
    post,
    path = "/api/ml/random-forest",
    tag = "ml",
    request_body = PredictRequest,
    responses(
        (status = 200, description = "시뮬레이션 예측 (구간 포함)", body = PredictionResult),
        (status = 400, description = "심볼 누락 또는 잘못된 본문", body = ApiErrorResponse),
        (status = 500, description = "데이터 조회 또는 계산 실패", body = ApiErrorResponse)
    )
)]
pub async fn predict_random_forest(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> ApiResult<Json<PredictionResult>> {
    let Json(request) = payload.map_err(json_rejection)?;
    run_prediction(&state, ModelType::RandomForest, request).await
}

/// ML 라우터 생성.
pub fn ml_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/linear-regression", post(predict_linear_regression))
        .route("/random-forest", post(predict_random_forest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{create_test_state, create_test_state_with};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use forecast_data::InMemoryProvider;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        Router::new().nest("/api/ml", ml_router()).with_state(Arc::new(state))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_linear_regression_success() {
        let response = app(create_test_state())
            .oneshot(post_json("/api/ml/linear-regression", r#"{"symbol": "AAPL"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["modelType"], "linear_regression");
        assert!(json["rSquared"].as_f64().unwrap() >= 0.87);
        assert!(json.get("predictionInterval").is_none());
    }

    #[tokio::test]
    async fn test_random_forest_includes_interval() {
        let response = app(create_test_state())
            .oneshot(post_json("/api/ml/random-forest", r#"{"symbol": "nvda", "seed": 5}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["symbol"], "NVDA");
        assert_eq!(json["modelType"], "random_forest");
        assert!(json["predictionInterval"]["width"].is_number());
        assert!(json["coefficientOfVariation"].is_number());
    }

    #[tokio::test]
    async fn test_seeded_requests_match() {
        let state = create_test_state();
        let first = app(state.clone())
            .oneshot(post_json("/api/ml/random-forest", r#"{"symbol": "AAPL", "seed": 11}"#))
            .await
            .unwrap();
        let second = app(state)
            .oneshot(post_json("/api/ml/random-forest", r#"{"symbol": "AAPL", "seed": 11}"#))
            .await
            .unwrap();

        let a = body_json(first).await;
        let b = body_json(second).await;
        assert_eq!(a["prediction"], b["prediction"]);
        assert_eq!(a["standardDeviation"], b["standardDeviation"]);
    }

    #[tokio::test]
    async fn test_missing_symbol_is_bad_request() {
        for body in [r#"{}"#, r#"{"symbol": ""}"#, r#"{"symbol": "   "}"#] {
            let response = app(create_test_state())
                .oneshot(post_json("/api/ml/linear-regression", body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
            let json = body_json(response).await;
            assert_eq!(json["code"], "MISSING_INPUT");
        }
    }

    #[tokio::test]
    async fn test_unreadable_body_is_json_bad_request() {
        for body in [r#"{"symbol": "AAPL""#, r#"{"symbol": 5}"#, r#"{"seed": -1}"#, ""] {
            let response = app(create_test_state())
                .oneshot(post_json("/api/ml/random-forest", body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
            let json = body_json(response).await;
            assert_eq!(json["code"], "INVALID_INPUT", "body: {}", body);
            assert!(json["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_missing_content_type_is_json_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/ml/linear-regression")
            .body(Body::from(r#"{"symbol": "AAPL"}"#))
            .unwrap();

        let response = app(create_test_state()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_internal_error() {
        let provider = Arc::new(InMemoryProvider::with_bundled());
        provider.set_failing("AAPL", true).await;

        let response = app(create_test_state_with(provider))
            .oneshot(post_json("/api/ml/random-forest", r#"{"symbol": "AAPL"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["code"], "NETWORK_FAILURE");
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_internal_error() {
        let response = app(create_test_state())
            .oneshot(post_json("/api/ml/linear-regression", r#"{"symbol": "MSFT"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["code"], "DATA_UNAVAILABLE");
    }
}
