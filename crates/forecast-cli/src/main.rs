//! 주가 예측 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # AAPL 월봉 12개 + 다음 달 예측
//! forecast series -s AAPL
//!
//! # NVDA 일봉 30개를 JSON으로
//! forecast series -s NVDA -i 1day -n 30 --format json
//!
//! # 랜덤 포레스트 시뮬레이션 (시드 고정)
//! forecast predict -s NVDA -m random-forest --seed 42
//!
//! # 대시보드 1회 갱신
//! forecast dashboard --symbols AAPL,NVDA
//!
//! # 네트워크 없이 번들 데이터로 실행
//! forecast --offline dashboard
//! ```

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use forecast_analytics::NaiveForecaster;
use forecast_cli::commands::{
    build_provider, render_dashboard, render_prediction, render_series, run_dashboard,
    run_predict, run_series, ModelArg, OutputFormat,
};
use forecast_core::{init_logging, AppConfig, LogConfig};

#[derive(Parser)]
#[command(name = "forecast")]
#[command(about = "Stock forecast CLI - 차트 시계열 및 시뮬레이션 예측", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(short, long, global = true, default_value = "config/forecast.toml")]
    config: String,

    /// 네트워크 없이 번들 AAPL/NVDA 데이터 사용
    #[arg(long, global = true, default_value = "false")]
    offline: bool,

    /// 출력 형식
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 차트 시계열과 다음 기간 예측
    Series {
        /// 종목 심볼 (예: AAPL)
        #[arg(short, long)]
        symbol: String,

        /// 캔들 간격 (1day, 1week, 1month 등)
        #[arg(short, long, default_value = "1month")]
        interval: String,

        /// 캔들 수 (2 ~ 5000)
        #[arg(short = 'n', long, default_value = "12")]
        outputsize: u32,
    },

    /// 시뮬레이션 예측 (학습된 모델 아님)
    Predict {
        /// 종목 심볼 (예: NVDA)
        #[arg(short, long)]
        symbol: String,

        /// 모델 유형
        #[arg(short, long, value_enum)]
        model: ModelArg,

        /// 난수 시드 (지정하면 결과 재현)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// 대시보드 1회 갱신 후 패널 출력
    Dashboard {
        /// 심볼 목록 (쉼표 구분, 기본: 설정 파일)
        #[arg(long, value_delimiter = ',')]
        symbols: Option<Vec<String>>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config))?;
    init_logging(LogConfig::from_settings(&config.logging).with_stderr(true))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let provider = build_provider(&config.provider, cli.offline)?;
    info!(provider = provider.name(), "시계열 제공자 준비");

    let output = match cli.command {
        Commands::Series {
            symbol,
            interval,
            outputsize,
        } => {
            let forecaster = NaiveForecaster::new(&config.forecast);
            let report =
                run_series(provider.as_ref(), &forecaster, &symbol, &interval, outputsize).await?;
            render_series(&report, cli.format)?
        }

        Commands::Predict {
            symbol,
            model,
            seed,
        } => {
            let result = run_predict(provider, &symbol, model, seed).await?;
            render_prediction(&result, cli.format)?
        }

        Commands::Dashboard { symbols } => {
            let mut dashboard_config = config.dashboard.clone();
            if let Some(symbols) = symbols {
                dashboard_config.symbols = symbols;
            }
            let forecaster = Arc::new(NaiveForecaster::new(&config.forecast));
            let snapshot = run_dashboard(provider, forecaster, dashboard_config).await?;
            render_dashboard(&snapshot, cli.format)?
        }
    };

    print!("{}", output);
    Ok(())
}
