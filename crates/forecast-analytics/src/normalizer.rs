//! 제공자 캔들을 차트용 시계열로 변환.

use forecast_core::{Bar, ForecastError, ForecastResult, Interval, SeriesPoint};

/// 예측에 필요한 최소 실제 포인트 수.
pub const MIN_POINTS: usize = 2;

/// 캔들을 오래된 순 `SeriesPoint` 목록으로 변환합니다.
///
/// 라벨은 `interval`의 세분도로 포맷하고, 정렬은 라벨 문자열이 아닌
/// 원본 타임스탬프 기준입니다. 동일 시각 캔들은 입력 순서를 유지합니다.
///
/// # Errors
///
/// 캔들이 [`MIN_POINTS`]개 미만이면 `InsufficientData`.
pub fn normalize(bars: &[Bar], interval: Interval) -> ForecastResult<Vec<SeriesPoint>> {
    if bars.len() < MIN_POINTS {
        return Err(ForecastError::InsufficientData {
            required: MIN_POINTS,
            actual: bars.len(),
        });
    }

    let mut sorted: Vec<&Bar> = bars.iter().collect();
    sorted.sort_by_key(|bar| bar.timestamp);

    Ok(sorted
        .into_iter()
        .map(|bar| SeriesPoint::actual(interval.format_label(&bar.timestamp), bar.timestamp, bar.close))
        .collect())
}
