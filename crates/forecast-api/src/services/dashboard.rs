//! 대시보드 패널 갱신 서비스.
//!
//! 설정된 심볼마다 차트 시계열, 단순 예측, 두 가지 시뮬레이션 예측을 담은
//! 패널을 유지합니다.
//!
//! # 갱신 규칙
//!
//! - 모든 심볼을 동시에 조회하며 한 심볼의 실패가 다른 심볼을 취소하지 않습니다.
//! - 실패한 패널은 에러 배너를 달고 마지막으로 성공한 시계열을 유지합니다.
//!   성공한 적이 없으면 번들 시계열로 대체합니다.
//! - 갱신마다 단조 증가하는 세대 번호를 발급합니다. 이미 더 새로운 세대가
//!   반영된 패널에는 늦게 끝난 갱신 결과를 적용하지 않습니다.
//! - 시뮬레이션 예측은 시계열과 별도의 세대와 주기(기본 하루)로 다시 계산합니다.
//!   예측 일자가 "오늘 + 1일"이라 시계열 주기(기본 30일)를 따르면 오래됩니다.
//!   예측 실패 시에는 이전 예측을 유지합니다.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use utoipa::ToSchema;

use forecast_analytics::{build_chart_series, Forecaster, PredictionSimulator, PLACEHOLDER_ACCURACY};
use forecast_core::{
    latest_actual_and_forecast, percent_change, series_span, Confidence, DashboardConfig,
    DecimalExt, ForecastResult, ModelType, PredictionResult, SeriesPoint, Symbol,
};
use forecast_data::{bundled_series, SeriesProvider, TimeSeriesRequest};

/// 단일 심볼 패널 스냅샷.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PanelSnapshot {
    /// 종목 심볼
    pub symbol: String,
    /// 차트 시계열 (마지막 원소가 예측 포인트)
    pub series: Vec<SeriesPoint>,
    /// 최신 실제 종가
    pub last_price: Option<f64>,
    /// 다음 기간 예측 가격
    pub predicted: Option<f64>,
    /// 최신 종가 대비 예측 변화율 (%)
    pub change_percent: Option<f64>,
    /// 마지막 갱신 실패 메시지
    pub error: Option<String>,
    /// 마지막으로 성공한 갱신 시각
    pub last_updated: Option<DateTime<Utc>>,
    /// 이 패널에 반영된 갱신 세대
    pub generation: u64,
    /// 번들 대체 시계열 사용 여부
    pub using_fallback: bool,
    /// 이 패널에 반영된 예측 세대
    pub prediction_generation: u64,
    /// 마지막으로 예측을 다시 계산한 시각
    pub predictions_updated: Option<DateTime<Utc>>,
    /// 선형 회귀 시뮬레이션
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linear_regression: Option<PredictionResult>,
    /// 랜덤 포레스트 시뮬레이션
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_forest: Option<PredictionResult>,
}

impl PanelSnapshot {
    fn empty(symbol: &Symbol) -> Self {
        Self {
            symbol: symbol.to_string(),
            series: Vec::new(),
            last_price: None,
            predicted: None,
            change_percent: None,
            error: None,
            last_updated: None,
            generation: 0,
            using_fallback: false,
            prediction_generation: 0,
            predictions_updated: None,
            linear_regression: None,
            random_forest: None,
        }
    }

    /// 시계열에서 요약 카드 값을 다시 계산합니다.
    fn set_series(&mut self, series: Vec<SeriesPoint>) {
        match latest_actual_and_forecast(&series) {
            Some((last, forecast)) => {
                let last = last.to_f64_lossy();
                let forecast = forecast.to_f64_lossy();
                self.last_price = Some(last);
                self.predicted = Some(forecast);
                self.change_percent = Some(percent_change(last, forecast));
            }
            None => {
                self.last_price = None;
                self.predicted = None;
                self.change_percent = None;
            }
        }
        self.series = series;
    }

    /// 예측 결과를 반영합니다. 오래된 예측 세대면 `false`.
    ///
    /// 실패한(`None`) 모델은 이전 예측을 유지합니다.
    fn set_predictions(&mut self, prediction_generation: u64, predictions: Predictions) -> bool {
        if self.prediction_generation >= prediction_generation {
            return false;
        }
        self.prediction_generation = prediction_generation;

        let updated =
            predictions.linear_regression.is_some() || predictions.random_forest.is_some();
        if let Some(prediction) = predictions.linear_regression {
            self.linear_regression = Some(prediction);
        }
        if let Some(prediction) = predictions.random_forest {
            self.random_forest = Some(prediction);
        }
        if updated {
            self.predictions_updated = Some(Utc::now());
        }
        true
    }
}

/// 전체 대시보드 스냅샷.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// 마지막으로 발급된 갱신 세대
    pub generation: u64,
    /// 마지막으로 발급된 예측 세대
    pub prediction_generation: u64,
    /// 과거 예측 정확도 (자리표시 값, %)
    pub accuracy: f64,
    /// 정확도 기반 신뢰도
    pub accuracy_confidence: Confidence,
    /// 심볼별 패널 (설정 순서)
    pub panels: Vec<PanelSnapshot>,
}

/// 한 심볼의 두 시뮬레이션 결과. 실패한 모델은 `None`.
struct Predictions {
    linear_regression: Option<PredictionResult>,
    random_forest: Option<PredictionResult>,
}

/// 한 심볼의 성공한 갱신 결과.
struct PanelData {
    series: Vec<SeriesPoint>,
    predictions: Predictions,
}

/// 대시보드 갱신 서비스.
pub struct DashboardService {
    provider: Arc<dyn SeriesProvider>,
    forecaster: Arc<dyn Forecaster>,
    simulator: PredictionSimulator,
    config: DashboardConfig,
    symbols: Vec<Symbol>,
    generation: AtomicU64,
    prediction_generation: AtomicU64,
    panels: RwLock<HashMap<Symbol, PanelSnapshot>>,
}

impl DashboardService {
    /// 새 서비스를 생성합니다.
    ///
    /// 설정의 심볼 중 중복은 제거되고, 잘못된 심볼이 있으면 에러를 반환합니다.
    pub fn new(
        provider: Arc<dyn SeriesProvider>,
        forecaster: Arc<dyn Forecaster>,
        config: DashboardConfig,
    ) -> ForecastResult<Self> {
        let mut symbols: Vec<Symbol> = Vec::with_capacity(config.symbols.len());
        for raw in &config.symbols {
            let symbol = Symbol::parse(raw)?;
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }

        let panels = symbols
            .iter()
            .map(|s| (s.clone(), PanelSnapshot::empty(s)))
            .collect();

        Ok(Self {
            simulator: PredictionSimulator::new(provider.clone()),
            provider,
            forecaster,
            config,
            symbols,
            generation: AtomicU64::new(0),
            prediction_generation: AtomicU64::new(0),
            panels: RwLock::new(panels),
        })
    }

    /// 추적 중인 심볼 목록.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// 마지막으로 발급된 세대.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 마지막으로 발급된 예측 세대.
    pub fn current_prediction_generation(&self) -> u64 {
        self.prediction_generation.load(Ordering::SeqCst)
    }

    fn next_prediction_generation(&self) -> u64 {
        self.prediction_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 모든 심볼을 다시 조회하고 새 스냅샷을 반환합니다.
    pub async fn refresh(&self) -> DashboardSnapshot {
        let generation = self.next_generation();
        self.refresh_at(generation).await;
        self.snapshot().await
    }

    /// 주어진 세대로 갱신을 수행합니다.
    async fn refresh_at(&self, generation: u64) {
        let prediction_generation = self.next_prediction_generation();
        info!(
            generation,
            prediction_generation,
            symbols = self.symbols.len(),
            provider = self.provider.name(),
            "대시보드 갱신 시작"
        );

        let outcomes = join_all(self.symbols.iter().map(|symbol| {
            let span = series_span!("dashboard_panel", symbol, self.config.history_interval);
            self.load_panel(symbol).instrument(span)
        }))
        .await;

        for (symbol, outcome) in self.symbols.iter().zip(outcomes) {
            self.apply(symbol, generation, prediction_generation, outcome)
                .await;
        }
    }

    /// 시계열은 그대로 두고 시뮬레이션 예측만 다시 계산합니다.
    pub async fn refresh_predictions(&self) -> DashboardSnapshot {
        let prediction_generation = self.next_prediction_generation();
        debug!(prediction_generation, "예측 갱신 시작");

        let outcomes = join_all(self.symbols.iter().map(|symbol| {
            let span = series_span!("dashboard_predictions", symbol);
            self.load_predictions(symbol).instrument(span)
        }))
        .await;

        {
            let mut panels = self.panels.write().await;
            for (symbol, predictions) in self.symbols.iter().zip(outcomes) {
                let panel = panels
                    .entry(symbol.clone())
                    .or_insert_with(|| PanelSnapshot::empty(symbol));
                if !panel.set_predictions(prediction_generation, predictions) {
                    warn!(
                        symbol = %symbol,
                        prediction_generation,
                        applied = panel.prediction_generation,
                        "오래된 예측 결과 무시"
                    );
                }
            }
        }

        self.snapshot().await
    }

    /// 한 심볼의 시계열과 시뮬레이션을 조회합니다.
    async fn load_panel(&self, symbol: &Symbol) -> ForecastResult<PanelData> {
        let interval = self.config.history_interval;
        let request =
            TimeSeriesRequest::new(symbol.clone(), interval, self.config.history_outputsize)?;
        let bars = self.provider.fetch_bars(&request).await?;
        let series = build_chart_series(&bars, symbol, interval, self.forecaster.as_ref())?;

        Ok(PanelData {
            series,
            predictions: self.load_predictions(symbol).await,
        })
    }

    /// 두 시뮬레이션을 동시에 실행합니다.
    async fn load_predictions(&self, symbol: &Symbol) -> Predictions {
        let (linear_regression, random_forest) = futures::join!(
            self.simulator.predict(ModelType::LinearRegression, symbol),
            self.simulator.predict(ModelType::RandomForest, symbol),
        );

        Predictions {
            linear_regression: Self::optional_prediction(symbol, linear_regression),
            random_forest: Self::optional_prediction(symbol, random_forest),
        }
    }

    fn optional_prediction(
        symbol: &Symbol,
        result: ForecastResult<PredictionResult>,
    ) -> Option<PredictionResult> {
        match result {
            Ok(prediction) => Some(prediction),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "시뮬레이션 예측 실패");
                None
            }
        }
    }

    /// 갱신 결과를 패널에 반영합니다. 오래된 세대면 버리고 `false`.
    async fn apply(
        &self,
        symbol: &Symbol,
        generation: u64,
        prediction_generation: u64,
        outcome: ForecastResult<PanelData>,
    ) -> bool {
        let mut panels = self.panels.write().await;
        let panel = panels
            .entry(symbol.clone())
            .or_insert_with(|| PanelSnapshot::empty(symbol));

        if panel.generation >= generation {
            warn!(
                symbol = %symbol,
                generation,
                applied = panel.generation,
                "오래된 갱신 결과 무시"
            );
            return false;
        }
        panel.generation = generation;

        match outcome {
            Ok(data) => {
                debug!(symbol = %symbol, generation, points = data.series.len(), "패널 갱신");
                panel.set_series(data.series);
                panel.set_predictions(prediction_generation, data.predictions);
                panel.error = None;
                panel.using_fallback = false;
                panel.last_updated = Some(Utc::now());
            }
            Err(e) => {
                warn!(symbol = %symbol, generation, error = %e, "패널 갱신 실패");
                panel.error = Some(e.to_string());
                if panel.series.is_empty() {
                    if let Some(fallback) = bundled_series(symbol.as_str()) {
                        panel.set_series(fallback);
                        panel.using_fallback = true;
                    }
                }
            }
        }
        true
    }

    /// 현재 스냅샷 (설정 순서).
    pub async fn snapshot(&self) -> DashboardSnapshot {
        let panels = self.panels.read().await;
        DashboardSnapshot {
            generation: self.current_generation(),
            prediction_generation: self.current_prediction_generation(),
            accuracy: PLACEHOLDER_ACCURACY,
            accuracy_confidence: Confidence::from_accuracy(PLACEHOLDER_ACCURACY),
            panels: self
                .symbols
                .iter()
                .filter_map(|s| panels.get(s).cloned())
                .collect(),
        }
    }

    /// 설정된 주기로 갱신하는 백그라운드 태스크를 시작합니다.
    ///
    /// 전체 갱신은 즉시 한 번 실행된 뒤 `refresh_interval`마다, 예측 갱신은
    /// `prediction_refresh_interval`마다 실행됩니다. `shutdown`이 취소되면 종료합니다.
    pub fn spawn_refresh_loop(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let period = self.config.refresh_interval();
        let prediction_period = self.config.prediction_refresh_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // 첫 전체 갱신이 예측도 계산하므로 한 주기 뒤부터 시작
            let mut prediction_ticker =
                tokio::time::interval_at(Instant::now() + prediction_period, prediction_period);
            prediction_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = prediction_ticker.tick() => {
                        let snapshot = self.refresh_predictions().await;
                        debug!(
                            prediction_generation = snapshot.prediction_generation,
                            "주기적 예측 갱신 완료"
                        );
                    }
                    _ = ticker.tick() => {
                        let snapshot = self.refresh().await;
                        let failed = snapshot.panels.iter().filter(|p| p.error.is_some()).count();
                        info!(
                            generation = snapshot.generation,
                            panels = snapshot.panels.len(),
                            failed,
                            "주기적 대시보드 갱신 완료"
                        );
                    }
                    _ = shutdown.cancelled() => {
                        info!("대시보드 갱신 루프 종료");
                        break;
                    }
                }
            }
        })
    }
}
