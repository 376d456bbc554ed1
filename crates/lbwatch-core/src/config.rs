//! Runtime configuration for the dashboard.

use std::path::PathBuf;
use std::time::Duration;

use crate::render::Rgba;
use crate::telemetry::Node;

/// Default sampling cadence of the overview poller.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default timeout for a single API request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Stroke colors of the overview charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartColors {
    pub cpu: Rgba,
    pub mem: Rgba,
    pub http: Rgba,
}

impl Default for ChartColors {
    fn default() -> Self {
        Self {
            cpu: Rgba::from_hsl(24.0, 0.95, 0.53),
            mem: Rgba::from_hsl(280.0, 0.65, 0.60),
            http: Rgba::from_hsl(217.0, 0.91, 0.60),
        }
    }
}

/// Settings the binary resolves from CLI flags and environment.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Base URL of the appliance API. `None` selects the demo backend.
    pub api_base: Option<String>,
    /// Node monitored at startup.
    pub node: Node,
    /// Overview polling cadence.
    pub poll_interval: Duration,
    /// Per-request timeout for the REST client.
    pub request_timeout: Duration,
    /// Header clock tick.
    pub tick_rate: Duration,
    pub colors: ChartColors,
    /// Directory CSV exports from the dashboard are written to.
    pub export_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            node: Node::Primary,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            tick_rate: Duration::from_secs(1),
            colors: ChartColors::default(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl DashboardConfig {
    /// Returns `true` when no API base is configured.
    pub fn is_demo(&self) -> bool {
        self.api_base.is_none()
    }
}
