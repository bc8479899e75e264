//! 가격 계산을 위한 Decimal 유틸리티.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 가격 타입.
pub type Price = Decimal;

/// Decimal 연산 확장 트레이트.
pub trait DecimalExt {
    /// 화면 표시용 소수점 반올림 (0.5는 0에서 먼 쪽으로).
    fn round_price(&self, dp: u32) -> Decimal;

    /// f64로 변환합니다. 표현할 수 없으면 0.0.
    fn to_f64_lossy(&self) -> f64;
}

impl DecimalExt for Decimal {
    fn round_price(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }

    fn to_f64_lossy(&self) -> f64 {
        self.to_f64().unwrap_or(0.0)
    }
}

/// `previous` 대비 `current`의 변화율 (비율, 0.1 = 10%).
///
/// `previous`가 0이면 `None`.
pub fn fractional_change(previous: Decimal, current: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    Some((current - previous) / previous)
}

/// `previous` 대비 `current`의 변화율 (퍼센트, f64).
///
/// `previous`가 0이면 0.0.
pub fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}
