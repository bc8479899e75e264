//! 시계열 조회 간격 정의.
//!
//! 외부 시계열 API가 사용하는 간격 문자열(`1day`, `1month` 등)과
//! 차트 라벨 형식을 함께 관리합니다.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 시계열 캔들 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub enum Interval {
    /// 1분봉
    #[serde(rename = "1min")]
    Min1,
    /// 5분봉
    #[serde(rename = "5min")]
    Min5,
    /// 15분봉
    #[serde(rename = "15min")]
    Min15,
    /// 30분봉
    #[serde(rename = "30min")]
    Min30,
    /// 45분봉
    #[serde(rename = "45min")]
    Min45,
    /// 1시간봉
    #[serde(rename = "1h")]
    Hour1,
    /// 2시간봉
    #[serde(rename = "2h")]
    Hour2,
    /// 4시간봉
    #[serde(rename = "4h")]
    Hour4,
    /// 일봉
    #[serde(rename = "1day")]
    Day1,
    /// 주봉
    #[serde(rename = "1week")]
    Week1,
    /// 월봉
    #[serde(rename = "1month")]
    Month1,
}

/// 차트 라벨 세분도.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelGranularity {
    /// "May 2024"
    Monthly,
    /// "May 3"
    Daily,
    /// "May 3 14:30"
    Intraday,
}

impl Interval {
    /// API 요청에 사용하는 간격 문자열.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Interval::Min1 => "1min",
            Interval::Min5 => "5min",
            Interval::Min15 => "15min",
            Interval::Min30 => "30min",
            Interval::Min45 => "45min",
            Interval::Hour1 => "1h",
            Interval::Hour2 => "2h",
            Interval::Hour4 => "4h",
            Interval::Day1 => "1day",
            Interval::Week1 => "1week",
            Interval::Month1 => "1month",
        }
    }

    /// API 간격 문자열에서 파싱합니다.
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "1min" => Some(Interval::Min1),
            "5min" => Some(Interval::Min5),
            "15min" => Some(Interval::Min15),
            "30min" => Some(Interval::Min30),
            "45min" => Some(Interval::Min45),
            "1h" => Some(Interval::Hour1),
            "2h" => Some(Interval::Hour2),
            "4h" => Some(Interval::Hour4),
            "1day" => Some(Interval::Day1),
            "1week" => Some(Interval::Week1),
            "1month" => Some(Interval::Month1),
            _ => None,
        }
    }

    /// 예측 라벨에 쓰이는 기간 이름 (`"Next Month (Pred)"`의 `Month`).
    pub fn period_name(&self) -> &'static str {
        match self {
            Interval::Min1 | Interval::Min5 | Interval::Min15 | Interval::Min30 | Interval::Min45 => {
                "Minute"
            }
            Interval::Hour1 | Interval::Hour2 | Interval::Hour4 => "Hour",
            Interval::Day1 => "Day",
            Interval::Week1 => "Week",
            Interval::Month1 => "Month",
        }
    }

    /// 이 간격의 라벨 세분도.
    pub fn granularity(&self) -> LabelGranularity {
        match self {
            Interval::Month1 => LabelGranularity::Monthly,
            Interval::Day1 | Interval::Week1 => LabelGranularity::Daily,
            _ => LabelGranularity::Intraday,
        }
    }

    /// 타임스탬프를 차트 라벨로 포맷합니다.
    pub fn format_label(&self, timestamp: &NaiveDateTime) -> String {
        match self.granularity() {
            LabelGranularity::Monthly => timestamp.format("%b %Y").to_string(),
            LabelGranularity::Daily => timestamp.format("%b %-d").to_string(),
            LabelGranularity::Intraday => timestamp.format("%b %-d %H:%M").to_string(),
        }
    }

    /// 합성 예측 포인트의 라벨.
    pub fn forecast_label(&self) -> String {
        format!("Next {} (Pred)", self.period_name())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_api_str(s).ok_or_else(|| format!("Invalid interval: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_interval_round_trip_str() {
        assert_eq!("1month".parse::<Interval>().unwrap(), Interval::Month1);
        assert_eq!(Interval::Day1.to_string(), "1day");
        assert!("1M".parse::<Interval>().is_err());
    }

    #[test]
    fn test_format_label() {
        assert_eq!(Interval::Month1.format_label(&ts(2024, 5, 1)), "May 2024");
        assert_eq!(Interval::Day1.format_label(&ts(2024, 5, 3)), "May 3");
        let intraday = NaiveDate::from_ymd_opt(2024, 5, 3)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(Interval::Min15.format_label(&intraday), "May 3 14:30");
    }

    #[test]
    fn test_forecast_label() {
        assert_eq!(Interval::Month1.forecast_label(), "Next Month (Pred)");
        assert_eq!(Interval::Day1.forecast_label(), "Next Day (Pred)");
    }

    #[test]
    fn test_serde_uses_api_str() {
        let json = serde_json::to_string(&Interval::Week1).unwrap();
        assert_eq!(json, "\"1week\"");
        let parsed: Interval = serde_json::from_str("\"1h\"").unwrap();
        assert_eq!(parsed, Interval::Hour1);
    }
}
