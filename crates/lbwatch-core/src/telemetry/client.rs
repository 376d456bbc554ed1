//! REST client for the appliance API.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::normalize;
use super::{
    ApplianceApi, Application, Capabilities, Envelope, ExportRequest, FailoverEvent,
    FailoverQuery, Node, ServiceInventory, SessionQuery, TelemetrySource, UnlockOutcome,
    UserSession,
};
use crate::error::FetchError;

/// HTTP client for the appliance backend.
///
/// Every call resolves to an [`Envelope`]; failures are logged and folded into
/// `ok = false`. A 401 additionally records that the operator has to log in
/// again (see [`ApplianceApi::auth_redirect`]).
pub struct HttpClient {
    base: String,
    http: reqwest::Client,
    login_required: AtomicBool,
}

impl HttpClient {
    /// Creates a client for `base` (e.g. `https://lb-admin.example.com`).
    pub fn new(base: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::from_reqwest)?;
        Ok(Self {
            base: base.into().trim_end_matches('/').to_string(),
            http,
            login_required: AtomicBool::new(false),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base, endpoint)
    }

    async fn get(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<reqwest::Response, FetchError> {
        let response = self
            .http
            .get(self.url(endpoint))
            .query(params)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        self.check_status(response)
    }

    async fn get_json(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, FetchError> {
        let response = self.get(endpoint, params).await?;
        response.json::<Value>().await.map_err(FetchError::from_reqwest)
    }

    async fn get_text(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<String, FetchError> {
        let response = self.get(endpoint, params).await?;
        response.text().await.map_err(FetchError::from_reqwest)
    }

    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Value, FetchError> {
        let response = self
            .http
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let response = self.check_status(response)?;
        response.json::<Value>().await.map_err(FetchError::from_reqwest)
    }

    fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            if !self.login_required.swap(true, Ordering::Relaxed) {
                warn!(login = %self.url("/login"), "session expired, login required");
            }
            return Err(FetchError::Unauthorized);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        self.login_required.store(false, Ordering::Relaxed);
        Ok(response)
    }

    fn envelope<T>(&self, endpoint: &str, result: Result<T, FetchError>) -> Envelope<T> {
        match &result {
            Ok(_) => debug!(endpoint, "api call succeeded"),
            Err(e) => warn!(endpoint, error = %e, "api call failed"),
        }
        Envelope::from_result(result)
    }
}

#[async_trait]
impl TelemetrySource for HttpClient {
    async fn system_stats(&self, node: Node) -> Envelope<Value> {
        let result = self
            .get_json("/api/system-stats", &[("node", node.as_str().to_string())])
            .await;
        self.envelope("/api/system-stats", result)
    }

    async fn ha_status(&self) -> Envelope<Value> {
        let result = self.get_json("/api/ha-status", &[]).await;
        self.envelope("/api/ha-status", result)
    }
}

#[async_trait]
impl ApplianceApi for HttpClient {
    async fn capabilities(&self) -> Envelope<Capabilities> {
        let result = self.get_json("/api/caps", &[]).await;
        self.envelope("/api/caps", result.map(|v| normalize::capabilities(&v)))
    }

    async fn applications(&self, node: Node) -> Envelope<Vec<Application>> {
        let result = self
            .get_json("/api/applications", &[("node", node.as_str().to_string())])
            .await;
        self.envelope(
            "/api/applications",
            result.map(|v| normalize::applications(&v)),
        )
    }

    async fn services(&self, node: Node) -> Envelope<ServiceInventory> {
        let result = self
            .get_json("/api/services", &[("node", node.as_str().to_string())])
            .await;
        self.envelope("/api/services", result.map(|v| normalize::services(&v)))
    }

    async fn failover_history(&self, query: &FailoverQuery) -> Envelope<Vec<FailoverEvent>> {
        let result = self
            .get_json("/api/failover-history", &query.params())
            .await;
        self.envelope(
            "/api/failover-history",
            result.map(|v| normalize::failover_events(&v)),
        )
    }

    async fn user_sessions(&self, query: &SessionQuery) -> Envelope<Vec<UserSession>> {
        let result = self.get_json("/api/user-sessions", &query.params()).await;
        self.envelope(
            "/api/user-sessions",
            result.map(|v| normalize::user_sessions(&v)),
        )
    }

    async fn unlock_user(&self, node: Node, username: &str) -> Envelope<UnlockOutcome> {
        let body = json!({ "node": node.as_str(), "username": username });
        let result = self.post_json("/api/unlock-user", &body).await;
        self.envelope(
            "/api/unlock-user",
            result.map(|v| normalize::unlock_outcome(&v, username)),
        )
    }

    async fn export_csv(&self, request: &ExportRequest) -> Envelope<String> {
        let endpoint = request.endpoint();
        let result = self.get_text(endpoint, &request.params()).await;
        self.envelope(endpoint, result)
    }

    fn auth_redirect(&self) -> Option<String> {
        self.login_required
            .load(Ordering::Relaxed)
            .then(|| self.url("/login"))
    }

    fn telemetry(self: Arc<Self>) -> Arc<dyn TelemetrySource> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_trailing_slash_trimmed() {
        let client = HttpClient::new("http://lb.local:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base(), "http://lb.local:8080");
        assert_eq!(client.url("/api/caps"), "http://lb.local:8080/api/caps");
        assert_eq!(client.auth_redirect(), None);
    }

    #[tokio::test]
    async fn test_unreachable_backend_yields_failed_envelope() {
        // Port 9 (discard) on localhost is closed in test environments.
        let client = HttpClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let env = client.system_stats(Node::Primary).await;
        assert!(!env.ok);
        assert!(env.error.is_some());
        assert!(env.into_result().is_err());
    }
}
