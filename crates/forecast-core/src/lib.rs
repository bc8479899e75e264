//! # Forecast Core
//!
//! 주가 예측 대시보드의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - OHLC 캔들(`Bar`)과 차트용 시계열 포인트(`SeriesPoint`)
//! - 시뮬레이션 예측 결과(`PredictionResult`)와 신뢰도 라벨
//! - 시계열 간격(`Interval`) 정의
//! - 설정 관리
//! - 로깅 인프라
//! - 에러 타입

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
