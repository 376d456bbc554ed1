//! Appliance telemetry: wire envelope, data sources and normalization.
//!
//! The dashboard never touches raw payloads directly. Every source returns
//! an [`Envelope`] around loosely-typed JSON, and [`normalize`] turns that
//! JSON into the strict records in [`model`]. Sources:
//! - [`HttpClient`] — the appliance REST API
//! - [`DemoBackend`] — canned data with jitter, used when no API is configured
//! - [`mock::MockSource`] — scripted responses for tests

mod client;
mod demo;
pub mod export;
pub mod mock;
pub mod model;
pub mod normalize;

pub use client::HttpClient;
pub use demo::DemoBackend;
pub use export::ExportRequest;
pub use model::*;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::FetchError;

/// Appliance node of the HA pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    #[default]
    Primary,
    Secondary,
}

impl Node {
    /// Query-string spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Node::Primary => "primary",
            Node::Secondary => "secondary",
        }
    }

    /// The other node of the pair.
    pub fn other(&self) -> Node {
        match self {
            Node::Primary => Node::Secondary,
            Node::Secondary => Node::Primary,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown node '{0}' (expected 'primary' or 'secondary')")]
pub struct ParseNodeError(String);

impl FromStr for Node {
    type Err = ParseNodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(Node::Primary),
            "secondary" => Ok(Node::Secondary),
            _ => Err(ParseNodeError(s.to_string())),
        }
    }
}

/// Uniform response envelope of every API call.
///
/// `ok = false` and transport failures are indistinguishable to callers:
/// both arrive here as `ok = false` with an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub ok: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl fmt::Display) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.to_string()),
        }
    }

    pub fn from_result(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(e),
        }
    }

    /// Collapses the envelope into a `Result`.
    pub fn into_result(self) -> Result<T, FetchError> {
        match (self.ok, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(FetchError::Decode("envelope without data".to_string())),
            (false, _) => Err(FetchError::Rejected(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }
}

/// Source of live telemetry polled by the sampler.
///
/// Implementations must not panic for ordinary failures; they report them as
/// `ok = false` envelopes. Payloads are raw JSON and go through
/// [`normalize::snapshot`] / [`normalize::ha_nodes`].
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Point-in-time system statistics for `node`.
    async fn system_stats(&self, node: Node) -> Envelope<Value>;

    /// HA pair status (list of node descriptors).
    async fn ha_status(&self) -> Envelope<Value>;
}

/// Full appliance API used by the dashboard views and the CLI.
#[async_trait]
pub trait ApplianceApi: TelemetrySource {
    async fn capabilities(&self) -> Envelope<Capabilities>;

    async fn applications(&self, node: Node) -> Envelope<Vec<Application>>;

    /// Backend services and service groups behind the applications.
    async fn services(&self, node: Node) -> Envelope<ServiceInventory>;

    async fn failover_history(&self, query: &FailoverQuery) -> Envelope<Vec<FailoverEvent>>;

    async fn user_sessions(&self, query: &SessionQuery) -> Envelope<Vec<UserSession>>;

    async fn unlock_user(&self, node: Node, username: &str) -> Envelope<UnlockOutcome>;

    /// Filtered list rendered as CSV.
    async fn export_csv(&self, request: &ExportRequest) -> Envelope<String>;

    /// Login location recorded after an HTTP 401, if any.
    fn auth_redirect(&self) -> Option<String> {
        None
    }

    /// Returns this API as the telemetry half consumed by the sampler.
    fn telemetry(self: Arc<Self>) -> Arc<dyn TelemetrySource>;
}
