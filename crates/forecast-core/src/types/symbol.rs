//! 종목 심볼.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ForecastError, ForecastResult};

/// 정규화된 종목 심볼 (앞뒤 공백 제거, 대문자).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// 입력 문자열에서 심볼을 생성합니다.
    ///
    /// 비어 있거나 공백뿐이면 `MissingInput`.
    pub fn parse(raw: &str) -> ForecastResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ForecastError::MissingInput("Symbol is required".to_string()));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(ForecastError::InvalidInput(format!(
                "심볼에 공백이 포함될 수 없습니다: {}",
                trimmed
            )));
        }
        Ok(Self(trimmed.to_uppercase()))
    }

    /// 선택적 입력에서 심볼을 생성합니다.
    pub fn from_optional(raw: Option<&str>) -> ForecastResult<Self> {
        match raw {
            Some(s) => Self::parse(s),
            None => Err(ForecastError::MissingInput("Symbol is required".to_string())),
        }
    }

    /// 문자열 참조.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
