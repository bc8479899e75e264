//! OHLC 캔들 데이터.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Price;

/// 단일 OHLC 관측치.
///
/// 외부 데이터 소스에서 받은 그대로이며 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// 캔들 시작 시각 (거래소 현지 시각)
    pub timestamp: NaiveDateTime,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량 (지수 등은 제공되지 않음)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<Decimal>,
}

impl Bar {
    /// 종가만 알고 있는 캔들을 생성합니다 (시가/고가/저가 = 종가).
    pub fn from_close(timestamp: NaiveDateTime, close: Price) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: None,
        }
    }
}
