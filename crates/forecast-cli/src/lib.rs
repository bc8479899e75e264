//! 주가 예측 CLI 도구 모음.
//!
//! API 서버와 같은 파이프라인(제공자 → 정규화 → 예측)을 터미널에서 실행합니다.

pub mod commands;

pub use commands::*;
