//! 주가 예측 대시보드 API 서버.
//!
//! Axum 기반 REST API 서버를 시작하고 대시보드 패널을 주기적으로 갱신합니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use forecast_analytics::NaiveForecaster;
use forecast_api::openapi::swagger_ui_router;
use forecast_api::routes::create_api_router;
use forecast_api::state::AppState;
use forecast_core::{init_logging, AppConfig, LogConfig};
use forecast_data::TwelveDataClient;

/// 설정 파일 경로 환경 변수.
const CONFIG_PATH_ENV: &str = "FORECAST_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/forecast.toml";

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`가 설정되면 해당 origin만 허용하고, 없으면 모두 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT])
        .max_age(Duration::from_secs(3600))
}

fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    Router::new()
        .merge(create_api_router().with_state(state))
        .merge(swagger_ui_router())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그나 `EXPORT_OPENAPI=1`이면 스펙 JSON을 stdout에 쓰고 종료합니다.
fn handle_export_openapi() -> Result<(), Box<dyn std::error::Error>> {
    use forecast_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
        println!("{}", json);
        std::process::exit(0);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    handle_export_openapi()?;

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load(&config_path)?;

    init_logging(LogConfig::from_settings(&config.logging))?;
    info!(config = %config_path, "Starting forecast API server...");

    let provider = Arc::new(TwelveDataClient::new(&config.provider).map_err(|e| {
        error!(error = %e, "시계열 제공자 초기화 실패");
        e
    })?);
    let forecaster = Arc::new(NaiveForecaster::new(&config.forecast));
    let state = Arc::new(AppState::new(
        provider,
        forecaster,
        config.dashboard.clone(),
    )?);

    info!(
        version = %state.version,
        symbols = ?state.dashboard.symbols(),
        refresh_secs = config.dashboard.refresh_interval_secs,
        prediction_refresh_secs = config.dashboard.prediction_refresh_interval_secs,
        "Application state initialized"
    );

    let shutdown_token = CancellationToken::new();
    let refresh_handle = state.dashboard.clone().spawn_refresh_loop(shutdown_token.clone());

    let addr = config.server.bind_address();
    let app = create_router(state, config.server.request_timeout());

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(%addr, error = %e, "소켓 바인딩 실패. server.host, server.port 설정을 확인하세요.");
        e
    })?;

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    if tokio::time::timeout(Duration::from_secs(10), refresh_handle)
        .await
        .is_err()
    {
        warn!("Cleanup timeout, forcing shutdown");
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM을 받으면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
