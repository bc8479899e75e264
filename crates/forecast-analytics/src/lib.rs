//! 시계열 정규화, 단순 예측, 예측 시뮬레이션.
//!
//! # 파이프라인
//!
//! ```text
//! Vec<Bar> (제공자 순서)
//!     └─ normalize()        → 오래된 순 SeriesPoint
//!         └─ Forecaster     → 다음 기간 예측값
//!             └─ 차트 시계열 (마지막에 합성 예측 포인트)
//! ```
//!
//! `PredictionSimulator`는 학습된 모델이 아닙니다. 고정 범위 난수로
//! 예측값과 품질 지표를 만들어내며, 같은 입력에도 호출마다 결과가 다릅니다.

pub mod forecaster;
pub mod normalizer;
pub mod simulator;

pub use forecaster::{build_chart_series, Forecaster, NaiveForecaster};
pub use normalizer::{normalize, MIN_POINTS};
pub use simulator::{PredictionSimulator, PLACEHOLDER_ACCURACY};
