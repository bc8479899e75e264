//! 차트 시계열 endpoint.
//!
//! `GET /api/series/{symbol}?interval=1month&outputsize=12`
//!
//! 제공자 캔들을 오래된 순으로 정렬하고 마지막에 다음 기간 예측 포인트를 붙입니다.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, Instrument};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use forecast_analytics::build_chart_series;
use forecast_core::{
    latest_actual_and_forecast, percent_change, series_span, DecimalExt, ForecastError, Interval,
    SeriesPoint, Symbol,
};
use forecast_data::TimeSeriesRequest;

use crate::error::{
    forecast_error, query_rejection, validation_error, ApiErrorResponse, ApiResult,
};
use crate::state::AppState;

/// 기본 간격.
const DEFAULT_INTERVAL: Interval = Interval::Month1;
/// 기본 캔들 수.
const DEFAULT_OUTPUTSIZE: u32 = 12;

/// 시계열 조회 쿼리.
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SeriesQuery {
    /// 캔들 간격 (`1day`, `1week`, `1month` 등, 기본 `1month`)
    pub interval: Option<String>,
    /// 캔들 수 (2 ~ 5000, 기본 12)
    #[validate(range(min = 2, max = 5000, message = "outputsize는 2-5000 범위여야 합니다"))]
    pub outputsize: Option<u32>,
}

/// 차트 시계열 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResponse {
    pub symbol: String,
    pub interval: Interval,
    /// 오래된 순 포인트, 마지막은 예측 포인트
    pub series: Vec<SeriesPoint>,
    /// 최신 실제 종가
    pub last_price: f64,
    /// 다음 기간 예측 가격
    pub predicted: f64,
    /// 최신 종가 대비 예측 변화율 (%)
    pub change_percent: f64,
}

/// 차트 시계열 조회.
#[utoipa::path(
    get,
    path = "/api/series/{symbol}",
    tag = "series",
    params(
        ("symbol" = String, Path, description = "종목 심볼"),
        SeriesQuery
    ),
    responses(
        (status = 200, description = "차트 시계열", body = SeriesResponse),
        (status = 400, description = "잘못된 간격 또는 캔들 수", body = ApiErrorResponse),
        (status = 500, description = "데이터 조회 또는 계산 실패", body = ApiErrorResponse)
    )
)]
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    query: Result<Query<SeriesQuery>, QueryRejection>,
) -> ApiResult<Json<SeriesResponse>> {
    let Query(query) = query.map_err(query_rejection)?;
    query.validate().map_err(validation_error)?;

    let symbol = Symbol::parse(&symbol).map_err(forecast_error)?;
    let interval = match query.interval.as_deref() {
        Some(raw) => raw
            .parse::<Interval>()
            .map_err(|e| forecast_error(ForecastError::InvalidInput(e)))?,
        None => DEFAULT_INTERVAL,
    };
    let outputsize = query.outputsize.unwrap_or(DEFAULT_OUTPUTSIZE);

    let span = series_span!("get_series", symbol, interval);
    load_series(&state, symbol, interval, outputsize)
        .instrument(span)
        .await
}

async fn load_series(
    state: &AppState,
    symbol: Symbol,
    interval: Interval,
    outputsize: u32,
) -> ApiResult<Json<SeriesResponse>> {
    let request =
        TimeSeriesRequest::new(symbol.clone(), interval, outputsize).map_err(forecast_error)?;
    let bars = state
        .provider
        .fetch_bars(&request)
        .await
        .map_err(forecast_error)?;
    let series = build_chart_series(&bars, &symbol, interval, state.forecaster.as_ref())
        .map_err(forecast_error)?;

    let (last, forecast) = latest_actual_and_forecast(&series)
        .ok_or_else(|| forecast_error(ForecastError::Internal("예측 포인트 누락".to_string())))?;
    let last_price = last.to_f64_lossy();
    let predicted = forecast.to_f64_lossy();

    debug!(points = series.len(), predicted, "시계열 응답");

    Ok(Json(SeriesResponse {
        symbol: symbol.to_string(),
        interval,
        series,
        last_price,
        predicted,
        change_percent: percent_change(last_price, predicted),
    }))
}

/// 시계열 라우터 생성.
pub fn series_router() -> Router<Arc<AppState>> {
    Router::new().route("/{symbol}", get(get_series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .nest("/api/series", series_router())
            .with_state(Arc::new(create_test_state()))
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_default_monthly_series() {
        let (status, json) = get("/api/series/aapl").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["symbol"], "AAPL");
        assert_eq!(json["interval"], "1month");

        let series = json["series"].as_array().unwrap();
        assert_eq!(series.len(), 13);
        assert_eq!(series[0]["label"], "Jun 2023");
        assert_eq!(series[11]["label"], "May 2024");
        assert_eq!(series[12]["label"], "Next Month (Pred)");
        assert!(series[12]["actual"].is_null());
        assert!(series[12]["forecast"].is_number());
        assert_eq!(json["lastPrice"], 206.86);
    }

    #[tokio::test]
    async fn test_outputsize_truncates() {
        let (status, json) = get("/api/series/NVDA?outputsize=4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["series"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_outputsize_below_two_rejected() {
        let (status, json) = get("/api/series/AAPL?outputsize=1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_invalid_interval_rejected() {
        let (status, json) = get("/api/series/AAPL?interval=1year").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_unparseable_query_is_json_bad_request() {
        for uri in ["/api/series/AAPL?outputsize=abc", "/api/series/AAPL?outputsize=-3"] {
            let (status, json) = get(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
            assert_eq!(json["code"], "INVALID_INPUT", "uri: {}", uri);
        }
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_internal_error() {
        let (status, json) = get("/api/series/MSFT").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["code"], "DATA_UNAVAILABLE");
    }
}
