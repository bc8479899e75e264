//! 시뮬레이션 예측 결과와 신뢰도 라벨.
//!
//! 예측 "모델"은 실제 학습된 모델이 아니라 고정 범위의 난수 시뮬레이션입니다.
//! 필드 이름은 대시보드가 소비하는 JSON(camelCase)과 일치해야 합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 예측 모델 변형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    LinearRegression,
    RandomForest,
}

impl ModelType {
    /// 와이어 형식 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::LinearRegression => "linear_regression",
            ModelType::RandomForest => "random_forest",
        }
    }

    /// 화면 표시 이름.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::LinearRegression => "Linear Regression",
            ModelType::RandomForest => "Random Forest",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "linear_regression" | "lr" => Ok(ModelType::LinearRegression),
            "random_forest" | "rf" => Ok(ModelType::RandomForest),
            _ => Err(format!("Unknown model type: {}", s)),
        }
    }
}

/// 범주형 신뢰도 라벨.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub enum Confidence {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl Confidence {
    /// 회귀 변형: R² 기반 단계 함수.
    ///
    /// `> 0.9` → High, `> 0.8` → Medium, 그 외 Low.
    pub fn from_r_squared(r_squared: f64) -> Self {
        if r_squared > 0.9 {
            Confidence::High
        } else if r_squared > 0.8 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// 랜덤 포레스트 변형: 변동계수(%) 기반 단계 함수. 경계 포함.
    ///
    /// `<= 5` → Very High, `<= 15` → High, 그 외 Medium.
    pub fn from_coefficient_of_variation(cv: f64) -> Self {
        if cv <= 5.0 {
            Confidence::VeryHigh
        } else if cv <= 15.0 {
            Confidence::High
        } else {
            Confidence::Medium
        }
    }

    /// 정확도(%) 기반 단계 함수.
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= 90.0 {
            Confidence::VeryHigh
        } else if accuracy >= 85.0 {
            Confidence::High
        } else if accuracy >= 75.0 {
            Confidence::Medium
        } else if accuracy >= 65.0 {
            Confidence::Low
        } else {
            Confidence::VeryLow
        }
    }

    /// 표시 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::VeryLow => "Very Low",
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
            Confidence::VeryHigh => "Very High",
        }
    }

    /// 모델 변형별 리스크 평가 문장.
    pub fn risk_assessment(&self, model: ModelType) -> &'static str {
        match (model, self) {
            (ModelType::LinearRegression, Confidence::High | Confidence::VeryHigh) => {
                "High confidence: Model shows strong predictive power with good R² score."
            }
            (ModelType::LinearRegression, Confidence::Medium) => {
                "Medium confidence: Model shows moderate predictive power."
            }
            (ModelType::LinearRegression, _) => {
                "Low confidence: Model performance is limited, treat prediction with caution."
            }
            (ModelType::RandomForest, Confidence::VeryHigh) => {
                "Very high confidence: Excellent agreement among model components with low relative volatility."
            }
            (ModelType::RandomForest, Confidence::High) => {
                "High confidence: Good agreement among model components with moderate relative volatility."
            }
            (ModelType::RandomForest, _) => {
                "Medium confidence: Some disagreement among model components or higher relative volatility."
            }
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 대칭 예측 구간.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct PredictionInterval {
    /// 하한
    pub lower: f64,
    /// 상한
    pub upper: f64,
    /// 구간 폭 (예측값 대비 %)
    pub width: f64,
}

/// 시뮬레이션 예측 결과.
///
/// 랜덤 포레스트 변형만 `prediction_interval`, `coefficient_of_variation`,
/// `standard_deviation`을 채웁니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub symbol: String,
    /// 최신 종가
    pub last_actual_price: f64,
    /// 최신 종가 일자 (제공자 원문)
    pub last_actual_date: String,
    /// 예측 가격
    pub prediction: f64,
    /// 예측 대상 일자 (생성 시점 + 1일, YYYY-MM-DD)
    pub prediction_date: String,
    /// 직전 종가 대비 최신 종가 변화율 (%)
    pub price_change_percent: f64,
    /// 최신 종가 대비 예측 가격 변화율 (%)
    pub prediction_change_percent: f64,
    pub confidence: Confidence,
    pub r_squared: f64,
    pub mse: f64,
    pub risk_assessment: String,
    pub model_type: ModelType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_interval: Option<PredictionInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient_of_variation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_deviation: Option<f64>,
}
