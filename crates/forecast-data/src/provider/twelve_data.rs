//! Twelve Data 시계열 API 클라이언트.
//!
//! `GET /time_series?symbol=&interval=&outputsize=&apikey=&format=JSON`
//!
//! 응답 예시:
//!
//! ```json
//! {
//!   "meta": { "symbol": "AAPL", "interval": "1month", "currency": "USD", ... },
//!   "values": [
//!     { "datetime": "2024-05-01", "open": "169.58", "high": "193.00",
//!       "low": "169.11", "close": "192.25", "volume": "1336537318" }
//!   ],
//!   "status": "ok"
//! }
//! ```
//!
//! 에러 시에는 `{"code": 400, "message": "...", "status": "error"}` 형태입니다.
//! 응답은 신뢰하지 않으며 `status`와 `values`를 검증합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use forecast_core::{AppConfig, Interval, Symbol};
//! use forecast_data::{SeriesProvider, TimeSeriesRequest, TwelveDataClient};
//!
//! let config = AppConfig::from_env()?;
//! let client = TwelveDataClient::new(&config.provider)?;
//! let request = TimeSeriesRequest::new(Symbol::parse("AAPL")?, Interval::Month1, 12)?;
//! let bars = client.fetch_bars(&request).await?;
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use forecast_core::{Bar, ForecastError, ForecastResult, ProviderConfig};

use super::{SeriesProvider, TimeSeriesRequest};

/// API 키가 설정되지 않았을 때 사용하는 공개 데모 키.
const DEMO_API_KEY: &str = "demo";

/// Twelve Data REST 클라이언트.
pub struct TwelveDataClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

/// `time_series` 응답 래퍼.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    meta: Option<TimeSeriesMeta>,
    #[serde(default)]
    values: Option<Vec<RawValue>>,
}

/// 응답 메타데이터.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct TimeSeriesMeta {
    symbol: Option<String>,
    interval: Option<String>,
    currency: Option<String>,
    exchange_timezone: Option<String>,
    exchange: Option<String>,
    #[serde(rename = "type")]
    instrument_type: Option<String>,
}

/// 값 목록의 원소. 모든 숫자는 문자열로 전달됩니다.
#[derive(Debug, Deserialize)]
struct RawValue {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    #[serde(default)]
    volume: Option<String>,
}

impl TwelveDataClient {
    /// 설정에서 클라이언트를 생성합니다.
    ///
    /// API 키가 없으면 공개 데모 키로 동작합니다 (일부 심볼만 조회 가능).
    pub fn new(config: &ProviderConfig) -> ForecastResult<Self> {
        let api_key = match &config.api_key {
            Some(key) => SecretString::new(key.expose_secret().into()),
            None => {
                warn!("Twelve Data API 키가 설정되지 않았습니다. 데모 키를 사용합니다.");
                SecretString::new(DEMO_API_KEY.into())
            }
        };

        Self::build(config.base_url.clone(), api_key, config.timeout())
    }

    /// 기본 URL을 지정하여 클라이언트를 생성합니다 (테스트용).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> ForecastResult<Self> {
        let api_key: String = api_key.into();
        Self::build(
            base_url.into(),
            SecretString::new(api_key.into_boxed_str()),
            Duration::from_secs(10),
        )
    }

    fn build(base_url: String, api_key: SecretString, timeout: Duration) -> ForecastResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForecastError::Internal(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 응답 본문을 검증하고 캔들로 변환합니다.
    fn parse_body(body: &str) -> ForecastResult<Vec<Bar>> {
        let response: TimeSeriesResponse = serde_json::from_str(body)?;

        if response.status.as_deref() == Some("error") {
            let message = response
                .message
                .unwrap_or_else(|| "Failed to fetch stock data".to_string());
            return Err(ForecastError::DataUnavailable(match response.code {
                Some(code) => format!("[{}] {}", code, message),
                None => message,
            }));
        }

        let values = match response.values {
            Some(values) if !values.is_empty() => values,
            _ => {
                return Err(ForecastError::DataUnavailable(
                    "No data values in API response".to_string(),
                ))
            }
        };

        values.into_iter().map(RawValue::into_bar).collect()
    }
}

impl RawValue {
    fn into_bar(self) -> ForecastResult<Bar> {
        Ok(Bar {
            timestamp: parse_datetime(&self.datetime)?,
            open: parse_price("open", &self.open)?,
            high: parse_price("high", &self.high)?,
            low: parse_price("low", &self.low)?,
            close: parse_price("close", &self.close)?,
            volume: match self.volume.as_deref() {
                Some(v) if !v.is_empty() => Some(parse_price("volume", v)?),
                _ => None,
            },
        })
    }
}

/// `YYYY-MM-DD` 또는 `YYYY-MM-DD HH:MM:SS` 파싱.
fn parse_datetime(raw: &str) -> ForecastResult<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ForecastError::Parse(format!("잘못된 datetime: {}", raw)))
}

fn parse_price(field: &str, raw: &str) -> ForecastResult<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|e| ForecastError::Parse(format!("잘못된 {} 값 '{}': {}", field, raw, e)))
}

/// 전송 계층 에러 변환.
///
/// 요청 URL에는 API 키가 들어 있으므로 메시지에서 URL을 제거합니다.
fn map_transport_error(err: reqwest::Error) -> ForecastError {
    let err = err.without_url();
    if err.is_timeout() {
        ForecastError::NetworkFailure(format!("요청 타임아웃: {}", err))
    } else {
        ForecastError::NetworkFailure(err.to_string())
    }
}

#[async_trait]
impl SeriesProvider for TwelveDataClient {
    fn name(&self) -> &str {
        "twelve_data"
    }

    async fn fetch_bars(&self, request: &TimeSeriesRequest) -> ForecastResult<Vec<Bar>> {
        let url = format!("{}/time_series", self.base_url);
        let outputsize = request.outputsize.to_string();

        debug!(
            symbol = %request.symbol,
            interval = %request.interval,
            outputsize = request.outputsize,
            url = %url,
            "Twelve Data 요청"
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", request.symbol.as_str()),
                ("interval", request.interval.as_api_str()),
                ("outputsize", outputsize.as_str()),
                ("apikey", self.api_key.expose_secret()),
                ("format", "JSON"),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::NetworkFailure(format!(
                "API request failed with status {}",
                status.as_u16()
            )));
        }

        let body = response.text().await.map_err(map_transport_error)?;
        let bars = Self::parse_body(&body)?;

        debug!(
            symbol = %request.symbol,
            count = bars.len(),
            "Twelve Data 응답 수신"
        );

        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_core::{Interval, Symbol};
    use mockito::Matcher;
    use rust_decimal_macros::dec;

    const SUCCESS_BODY: &str = r#"{
        "meta": {"symbol": "AAPL", "interval": "1day", "currency": "USD",
                 "exchange_timezone": "America/New_York", "exchange": "NASDAQ", "type": "Common Stock"},
        "values": [
            {"datetime": "2024-05-31", "open": "191.44", "high": "192.57", "low": "189.91", "close": "192.25", "volume": "75158300"},
            {"datetime": "2024-05-30", "open": "190.76", "high": "192.18", "low": "190.63", "close": "191.29", "volume": "49947900"}
        ],
        "status": "ok"
    }"#;

    fn request(outputsize: u32) -> TimeSeriesRequest {
        TimeSeriesRequest::new(Symbol::parse("AAPL").unwrap(), Interval::Day1, outputsize).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_bars_success_keeps_provider_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/time_series")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("symbol".into(), "AAPL".into()),
                Matcher::UrlEncoded("interval".into(), "1day".into()),
                Matcher::UrlEncoded("outputsize".into(), "2".into()),
                Matcher::UrlEncoded("apikey".into(), "test-key".into()),
                Matcher::UrlEncoded("format".into(), "JSON".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SUCCESS_BODY)
            .create_async()
            .await;

        let client = TwelveDataClient::with_base_url(server.url(), "test-key").unwrap();
        let bars = client.fetch_bars(&request(2)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, dec!(192.25));
        assert_eq!(bars[1].close, dec!(191.29));
        assert!(bars[0].timestamp > bars[1].timestamp);
        assert_eq!(bars[0].volume, Some(dec!(75158300)));
    }

    #[tokio::test]
    async fn test_fetch_bars_empty_values_is_data_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/time_series")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"meta": {"symbol": "AAPL"}, "values": [], "status": "ok"}"#)
            .create_async()
            .await;

        let client = TwelveDataClient::with_base_url(server.url(), "k").unwrap();
        let err = client.fetch_bars(&request(12)).await.unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_fetch_bars_error_status_is_data_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/time_series")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code": 404, "message": "symbol not found", "status": "error"}"#)
            .create_async()
            .await;

        let client = TwelveDataClient::with_base_url(server.url(), "k").unwrap();
        match client.fetch_bars(&request(12)).await {
            Err(ForecastError::DataUnavailable(msg)) => assert!(msg.contains("symbol not found")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_bars_http_failure_is_network_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/time_series")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = TwelveDataClient::with_base_url(server.url(), "k").unwrap();
        let err = client.fetch_bars(&request(12)).await.unwrap_err();
        assert!(matches!(err, ForecastError::NetworkFailure(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_bars_unreachable_host_is_network_failure() {
        let client = TwelveDataClient::with_base_url("http://127.0.0.1:1", "k").unwrap();
        let err = client.fetch_bars(&request(2)).await.unwrap_err();
        assert!(matches!(err, ForecastError::NetworkFailure(_)));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let client =
            TwelveDataClient::with_base_url("http://127.0.0.1:1", "SUPERSECRET123").unwrap();
        let err = client.fetch_bars(&request(2)).await.unwrap_err();

        let message = err.to_string();
        assert!(!message.contains("SUPERSECRET123"), "{}", message);
        assert!(!message.contains("apikey="), "{}", message);
        assert!(!format!("{:?}", err).contains("SUPERSECRET123"));
    }

    #[test]
    fn test_parse_body_malformed_json() {
        let err = TwelveDataClient::parse_body("not json").unwrap_err();
        assert!(matches!(err, ForecastError::Parse(_)));
    }

    #[test]
    fn test_parse_body_missing_values() {
        let err = TwelveDataClient::parse_body(r#"{"status": "ok"}"#).unwrap_err();
        assert!(matches!(err, ForecastError::DataUnavailable(_)));
    }

    #[test]
    fn test_parse_body_bad_close() {
        let body = r#"{"values": [{"datetime": "2024-05-31", "open": "1", "high": "1", "low": "1", "close": "n/a"}], "status": "ok"}"#;
        let err = TwelveDataClient::parse_body(body).unwrap_err();
        assert!(matches!(err, ForecastError::Parse(_)));
    }

    #[test]
    fn test_parse_datetime_formats() {
        let daily = parse_datetime("2024-05-31").unwrap();
        assert_eq!(daily.format("%Y-%m-%d %H:%M").to_string(), "2024-05-31 00:00");
        let intraday = parse_datetime("2024-05-31 15:45:00").unwrap();
        assert_eq!(intraday.format("%H:%M").to_string(), "15:45");
        assert!(parse_datetime("31/05/2024").is_err());
    }
}
