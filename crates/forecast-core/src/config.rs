//! 설정 관리.
//!
//! 기본값 → 설정 파일(TOML, 선택) → `FORECAST__*` 환경 변수 순으로 병합합니다.
//! API 키는 전역 상태가 아니라 명시적인 설정 값으로 fetcher에 전달됩니다.
//!
//! ```text
//! FORECAST__SERVER__PORT=8080
//! FORECAST__PROVIDER__API_KEY=...        (또는 TWELVE_DATA_API_KEY)
//! FORECAST__DASHBOARD__SYMBOLS=AAPL,NVDA
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

use crate::types::Interval;

/// API 키 환경 변수 (접두사 없는 폴백).
pub const API_KEY_ENV: &str = "TWELVE_DATA_API_KEY";

/// 제공자가 허용하는 최소 캔들 수.
pub const MIN_OUTPUTSIZE: u32 = 2;

/// 제공자가 허용하는 최대 캔들 수.
pub const MAX_OUTPUTSIZE: u32 = 5000;

/// 애플리케이션 설정.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 외부 시계열 제공자 설정
    pub provider: ProviderConfig,
    /// 단순 예측기 설정
    pub forecast: ForecastConfig,
    /// 대시보드 갱신 설정
    pub dashboard: DashboardConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// `host:port` 문자열.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 요청 타임아웃.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 외부 시계열 제공자 설정.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// API 키
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    /// HTTP 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twelvedata.com".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// HTTP 타임아웃.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .map(|s| SecretString::new(s.into_boxed_str())))
}

/// 단순 예측기 설정.
///
/// 심볼별 배율은 근거 없는 상수입니다. 1.0으로 두면 배율 없이 동작합니다.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// 별도 배율을 적용할 심볼
    pub designated_symbol: String,
    /// 지정 심볼 배율
    pub designated_multiplier: Decimal,
    /// 그 외 심볼 배율
    pub default_multiplier: Decimal,
    /// 평균 변화율 계산에 사용할 최근 포인트 수
    pub window: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            designated_symbol: "AAPL".to_string(),
            designated_multiplier: dec!(1.005),
            default_multiplier: dec!(1.01),
            window: 4,
        }
    }
}

/// 대시보드 갱신 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// 추적할 심볼 목록
    pub symbols: Vec<String>,
    /// 차트 시계열 간격
    pub history_interval: Interval,
    /// 차트 시계열 길이
    pub history_outputsize: u32,
    /// 시계열 전체 갱신 간격 (초)
    pub refresh_interval_secs: u64,
    /// 시뮬레이션 예측만 다시 계산하는 간격 (초)
    pub prediction_refresh_interval_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["AAPL".to_string(), "NVDA".to_string()],
            history_interval: Interval::Month1,
            history_outputsize: 12,
            refresh_interval_secs: 30 * 24 * 60 * 60,
            prediction_refresh_interval_secs: 24 * 60 * 60,
        }
    }
}

impl DashboardConfig {
    /// 주기적 갱신 간격.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// 시뮬레이션 예측 갱신 간격.
    pub fn prediction_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.prediction_refresh_interval_secs)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false));
        Self::build(builder)
    }

    /// 기본값과 환경 변수에서 설정을 로드합니다.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::build(config::Config::builder())
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        let mut app: AppConfig = builder
            .add_source(
                config::Environment::with_prefix("FORECAST")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("dashboard.symbols")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        if app.provider.api_key.is_none() {
            app.provider.api_key = std::env::var(API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(|key| SecretString::new(key.into_boxed_str()));
        }

        app.validate()?;
        Ok(app)
    }

    /// 설정 값의 기본적인 유효성을 검사합니다.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.forecast.window < 2 {
            return Err(config::ConfigError::Message(format!(
                "forecast.window는 2 이상이어야 합니다: {}",
                self.forecast.window
            )));
        }
        if !(MIN_OUTPUTSIZE..=MAX_OUTPUTSIZE).contains(&self.dashboard.history_outputsize) {
            return Err(config::ConfigError::Message(format!(
                "dashboard.history_outputsize는 {}-{} 범위여야 합니다: {}",
                MIN_OUTPUTSIZE, MAX_OUTPUTSIZE, self.dashboard.history_outputsize
            )));
        }
        if self.dashboard.refresh_interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "dashboard.refresh_interval_secs는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.dashboard.prediction_refresh_interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "dashboard.prediction_refresh_interval_secs는 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.forecast.designated_symbol, "AAPL");
        assert_eq!(config.forecast.designated_multiplier, dec!(1.005));
        assert_eq!(config.forecast.default_multiplier, dec!(1.01));
        assert_eq!(config.dashboard.symbols, vec!["AAPL", "NVDA"]);
        assert_eq!(config.dashboard.history_interval, Interval::Month1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "forecast-config-test-{}.toml",
            std::process::id()
        ));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(
                file,
                r#"
[server]
port = 8088

[provider]
api_key = "demo-key"

[forecast]
default_multiplier = 1.0

[dashboard]
symbols = ["MSFT"]
history_interval = "1day"
history_outputsize = 30
"#
            )
            .unwrap();
        }

        let config = AppConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.port, 8088);
        assert!(config.provider.api_key.is_some());
        assert_eq!(config.forecast.default_multiplier, dec!(1));
        assert_eq!(config.dashboard.symbols, vec!["MSFT"]);
        assert_eq!(config.dashboard.history_interval, Interval::Day1);
        assert_eq!(config.dashboard.history_outputsize, 30);
        // 파일에 없는 값은 기본값 유지
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_validate_outputsize_bounds() {
        let mut config = AppConfig::default();

        config.dashboard.history_outputsize = MAX_OUTPUTSIZE;
        assert!(config.validate().is_ok());

        config.dashboard.history_outputsize = 6000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("6000"));

        config.dashboard.history_outputsize = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prediction_refresh_defaults_to_daily() {
        let mut config = AppConfig::default();
        assert_eq!(config.dashboard.prediction_refresh_interval(), Duration::from_secs(86_400));
        assert_eq!(
            config.dashboard.refresh_interval(),
            Duration::from_secs(30 * 86_400)
        );

        config.dashboard.prediction_refresh_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_short_window() {
        let mut config = AppConfig::default();
        config.forecast.window = 1;
        assert!(config.validate().is_err());
    }
}
