//! 백그라운드 서비스.

pub mod dashboard;

pub use dashboard::{DashboardService, DashboardSnapshot, PanelSnapshot};
