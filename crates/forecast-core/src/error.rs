//! 예측 파이프라인의 에러 타입.
//!
//! 시계열 조회, 정규화, 예측, 시뮬레이션 전 단계에서 공통으로 사용하는
//! 에러를 정의합니다. 어떤 에러도 자동으로 재시도되지 않으며,
//! 발생 지점에 가장 가까운 경계(HTTP 핸들러, 대시보드 서비스)에서 처리됩니다.

use thiserror::Error;

/// 예측 파이프라인 에러.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// 필수 입력 누락 (예: 심볼 없음)
    #[error("필수 입력 누락: {0}")]
    MissingInput(String),

    /// 외부 데이터 소스가 에러 상태를 반환했거나 값이 비어 있음
    #[error("데이터 없음: {0}")]
    DataUnavailable(String),

    /// 전송 계층 실패 (연결, 타임아웃, HTTP 상태)
    #[error("네트워크 에러: {0}")]
    NetworkFailure(String),

    /// 계산에 필요한 데이터 포인트 부족
    #[error("데이터 부족: 최소 {required}개 필요, {actual}개 존재")]
    InsufficientData { required: usize, actual: usize },

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 응답 파싱 에러
    #[error("파싱 에러: {0}")]
    Parse(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 예측 파이프라인 작업을 위한 Result 타입.
pub type ForecastResult<T> = Result<T, ForecastError>;

impl ForecastError {
    /// 재시도로 해결될 수 있는 에러인지 확인합니다.
    ///
    /// 파이프라인은 재시도하지 않습니다. 호출자가 판단할 때 참고용입니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ForecastError::NetworkFailure(_))
    }

    /// 호출자 입력이 원인인 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ForecastError::MissingInput(_) | ForecastError::InvalidInput(_)
        )
    }

    /// 에러 종류를 나타내는 안정적인 코드 문자열.
    pub fn code(&self) -> &'static str {
        match self {
            ForecastError::MissingInput(_) => "MISSING_INPUT",
            ForecastError::DataUnavailable(_) => "DATA_UNAVAILABLE",
            ForecastError::NetworkFailure(_) => "NETWORK_FAILURE",
            ForecastError::InsufficientData { .. } => "INSUFFICIENT_DATA",
            ForecastError::InvalidInput(_) => "INVALID_INPUT",
            ForecastError::Parse(_) => "PARSE_ERROR",
            ForecastError::Config(_) => "CONFIG_ERROR",
            ForecastError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Parse(err.to_string())
    }
}

impl From<config::ConfigError> for ForecastError {
    fn from(err: config::ConfigError) -> Self {
        ForecastError::Config(err.to_string())
    }
}
