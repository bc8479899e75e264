//! API 에러 응답 타입.
//!
//! 모든 엔드포인트는 실패 시 같은 JSON 형식을 반환합니다.
//!
//! ```json
//! {
//!   "code": "MISSING_INPUT",
//!   "message": "필수 입력 누락: Symbol is required",
//!   "timestamp": 1717200000
//! }
//! ```
//!
//! 상태 코드는 호출자 입력 문제(`MissingInput`, `InvalidInput`)만 400이고
//! 나머지는 모두 500입니다. 본문이나 쿼리를 해석하지 못한 경우도
//! `INVALID_INPUT` 400으로 응답합니다.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::Json;
use forecast_core::ForecastError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// API 에러 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "MISSING_INPUT", "DATA_UNAVAILABLE")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 파이프라인 에러의 HTTP 상태 코드.
pub fn status_for(err: &ForecastError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// 파이프라인 에러를 핸들러 에러로 변환합니다.
pub fn forecast_error(err: ForecastError) -> (StatusCode, Json<ApiErrorResponse>) {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(code = err.code(), error = %err, "요청 처리 실패");
    }
    (status, Json(ApiErrorResponse::new(err.code(), err.to_string())))
}

/// JSON 본문 추출 실패를 400 응답으로 변환합니다.
pub fn json_rejection(rejection: JsonRejection) -> (StatusCode, Json<ApiErrorResponse>) {
    forecast_error(ForecastError::InvalidInput(rejection.body_text()))
}

/// 쿼리 문자열 추출 실패를 400 응답으로 변환합니다.
pub fn query_rejection(rejection: QueryRejection) -> (StatusCode, Json<ApiErrorResponse>) {
    forecast_error(ForecastError::InvalidInput(rejection.body_text()))
}

/// `validator` 검증 실패를 400 응답으로 변환합니다.
pub fn validation_error(errors: ValidationErrors) -> (StatusCode, Json<ApiErrorResponse>) {
    let message = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ");

    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new("VALIDATION_ERROR", message)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert!(error.timestamp.is_some());
        assert!(error.details.is_none());
    }

    #[test]
    fn test_with_details_serializes() {
        let error = ApiErrorResponse::with_details(
            "VALIDATION_ERROR",
            "Invalid input",
            serde_json::json!({"field": "outputsize"}),
        );
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""code":"VALIDATION_ERROR""#));
        assert!(json.contains(r#""field":"outputsize""#));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ForecastError::MissingInput("Symbol is required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ForecastError::InvalidInput("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ForecastError::DataUnavailable("none".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&ForecastError::InsufficientData {
                required: 2,
                actual: 1
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&ForecastError::NetworkFailure("timeout".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_forecast_error_body_code() {
        let (status, Json(body)) = forecast_error(ForecastError::MissingInput("Symbol is required".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "MISSING_INPUT");
        assert!(body.message.contains("Symbol is required"));
    }
}
