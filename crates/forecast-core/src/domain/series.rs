//! 차트용 시계열 포인트.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 차트에 바로 그릴 수 있는 레코드.
///
/// 과거 포인트는 `actual`만, 마지막 합성 예측 포인트는 `forecast`만 가집니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// 표시용 라벨 (예: "May 2024", "Next Month (Pred)")
    pub label: String,
    /// 라벨의 원본 시각. 합성 예측 포인트에는 없음
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<String>))]
    pub timestamp: Option<NaiveDateTime>,
    /// 실제 종가
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<f64>))]
    pub actual: Option<Decimal>,
    /// 예측 종가
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[cfg_attr(feature = "utoipa-support", schema(value_type = Option<f64>))]
    pub forecast: Option<Decimal>,
}

impl SeriesPoint {
    /// 실제 관측 포인트.
    pub fn actual(label: impl Into<String>, timestamp: NaiveDateTime, close: Decimal) -> Self {
        Self {
            label: label.into(),
            timestamp: Some(timestamp),
            actual: Some(close),
            forecast: None,
        }
    }

    /// 합성 예측 포인트.
    pub fn forecast(label: impl Into<String>, value: Decimal) -> Self {
        Self {
            label: label.into(),
            timestamp: None,
            actual: None,
            forecast: Some(value),
        }
    }

    /// 합성 예측 포인트인지 확인합니다.
    pub fn is_forecast(&self) -> bool {
        self.actual.is_none() && self.forecast.is_some()
    }
}

/// 시계열에서 마지막 실제 가격과 예측 가격을 꺼냅니다.
///
/// 마지막 원소가 예측 포인트이고 그 직전이 최신 실제 포인트라고 가정합니다.
pub fn latest_actual_and_forecast(series: &[SeriesPoint]) -> Option<(Decimal, Decimal)> {
    let (last, rest) = series.split_last()?;
    let forecast = last.forecast?;
    let actual = rest.iter().rev().find_map(|p| p.actual)?;
    Some((actual, forecast))
}
