//! lbwatch-core — shared library for the lbwatch appliance dashboard.
//!
//! Provides:
//! - `telemetry` — wire envelope, snapshot normalization, REST client, demo and mock sources
//! - `history` — fixed-capacity rolling window of request-rate samples
//! - `sampler` — poll sessions, epoch-guarded sample application, derived scalars
//! - `render` — gauge and trend renderers over a pixel `Surface`
//! - `viewport` — container width tracking for resize-driven redraws
//! - `fmt` — shared formatting helpers (percent, rate, placeholders)
//!
//! With `tui` feature (default):
//! - `tui` — terminal dashboard (ratatui/crossterm), state, input, widgets

pub mod config;
pub mod error;
pub mod fmt;
pub mod history;
pub mod render;
pub mod sampler;
pub mod telemetry;
pub mod viewport;

#[cfg(feature = "tui")]
pub mod tui;

pub use config::{ChartColors, DashboardConfig};
pub use error::FetchError;

/// Crate version, shown in the dashboard header and `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
