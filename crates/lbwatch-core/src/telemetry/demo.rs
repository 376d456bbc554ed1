//! Demo backend with canned appliance data.
//!
//! Used when no API base is configured. CPU and request rate jitter on every
//! call so the gauges and trend line move like a live appliance.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde_json::{Value, json};

use super::export::{failover_csv, sessions_csv};
use super::normalize;
use super::{
    ApplianceApi, Application, Capabilities, Envelope, ExportRequest, FailoverEvent,
    FailoverQuery, Node, ServiceInventory, SessionQuery, TelemetrySource, UnlockOutcome,
    UserSession,
};

struct NodeProfile {
    ip: &'static str,
    hostname: &'static str,
    ha_role: &'static str,
    cpu: f64,
    mem: f64,
    http_rate: f64,
}

const VERSION: &str = "14.1-29.63 (ns-14.1-29.63.nc)";

const PRIMARY: NodeProfile = NodeProfile {
    ip: "10.0.0.100",
    hostname: "ns-primary-01",
    ha_role: "PRIMARY",
    cpu: 23.5,
    mem: 45.2,
    http_rate: 1247.0,
};

const SECONDARY: NodeProfile = NodeProfile {
    ip: "10.0.0.200",
    hostname: "ns-secondary-01",
    ha_role: "SECONDARY",
    cpu: 8.1,
    mem: 38.7,
    http_rate: 0.0,
};

/// Canned backend; see module docs.
#[derive(Debug, Clone)]
pub struct DemoBackend {
    unlock_delay: Duration,
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoBackend {
    pub fn new() -> Self {
        Self {
            unlock_delay: Duration::from_millis(800),
        }
    }

    /// Overrides the simulated latency of the unlock action.
    pub fn with_unlock_delay(mut self, delay: Duration) -> Self {
        self.unlock_delay = delay;
        self
    }

    fn stats(node: Node) -> Value {
        let profile = match node {
            Node::Primary => &PRIMARY,
            Node::Secondary => &SECONDARY,
        };
        let mut rng = rand::thread_rng();
        let cpu = (profile.cpu + rng.gen_range(-2.5..2.5)).clamp(0.0, 100.0);
        let http = (profile.http_rate + rng.gen_range(-100.0..100.0_f64).floor()).max(0.0);
        json!({
            "ip": profile.ip,
            "version": VERSION,
            "ha_role": profile.ha_role,
            "hostname": profile.hostname,
            "ns_stats": {"ns": {
                "cpuusagepcnt": cpu,
                "memusagepcnt": profile.mem,
                "httprequestsrate": http,
            }},
        })
    }

    fn ha_nodes() -> Value {
        json!({"hanode": [
            {"ipaddress": PRIMARY.ip, "hostname": PRIMARY.hostname, "state": "PRIMARY", "hasync": "SUCCESS"},
            {"ipaddress": SECONDARY.ip, "hostname": SECONDARY.hostname, "state": "SECONDARY", "hasync": "SUCCESS"},
        ]})
    }

    fn applications() -> Value {
        json!({"applications": [
            {"name": "vs_web_http", "ipv46": "192.168.1.100", "port": 80, "curstate": "UP"},
            {"name": "vs_web_https", "ipv46": "192.168.1.100", "port": 443, "curstate": "UP"},
            {"name": "vs_api_gateway", "ipv46": "192.168.1.101", "port": 443, "curstate": "UP"},
            {"name": "vs_mail_smtp", "ipv46": "192.168.1.102", "port": 25, "curstate": "DOWN"},
            {"name": "vs_dns", "ipv46": "192.168.1.103", "port": 53, "curstate": "UP"},
        ]})
    }

    fn services() -> Value {
        json!({
            "service": [
                {"name": "svc_web1", "ip": "10.10.1.10", "port": 80, "curstate": "UP", "servicetype": "HTTP"},
                {"name": "svc_web2", "ip": "10.10.1.11", "port": 80, "curstate": "UP", "servicetype": "HTTP"},
                {"name": "svc_web3", "ip": "10.10.1.12", "port": 80, "curstate": "DOWN", "servicetype": "HTTP"},
                {"name": "svc_api1", "ip": "10.10.2.10", "port": 8080, "curstate": "UP", "servicetype": "HTTP"},
                {"name": "svc_api2", "ip": "10.10.2.11", "port": 8080, "curstate": "UP", "servicetype": "HTTP"},
            ],
            "servicegroup": [
                {"name": "sg_web_pool", "servicetype": "HTTP", "state": "ENABLED", "numbound": 3},
            ],
        })
    }

    fn sessions() -> Value {
        json!({"sessions": [
            {"user": "john.doe@company.com", "type": "VPN", "status": "Active", "duration": "45 min",
             "ip": "203.0.113.42", "node": "primary", "start": "2025-12-08 09:15:00"},
            {"user": "jane.smith@company.com", "type": "AAA/Web", "status": "Active", "duration": "120 min",
             "ip": "198.51.100.23", "node": "primary", "start": "2025-12-08 08:00:00"},
            {"user": "bob.wilson@company.com", "type": "VPN", "status": "Active", "duration": "30 min",
             "ip": "192.0.2.56", "node": "primary", "start": "2025-12-08 09:30:00"},
            {"user": "alice.johnson@company.com", "type": "AAA/Web", "status": "Terminated", "duration": "15 min",
             "ip": "203.0.113.89", "node": "secondary", "start": "2025-12-08 07:45:00"},
        ]})
    }

    fn failover_events() -> Value {
        json!({"events": [
            {"timestamp": "2025-12-07T14:32:00", "type": "State Change",
             "reason": "Node 10.0.0.100 is currently PRIMARY", "role_change": "Current: PRIMARY"},
            {"timestamp": "2025-12-07T14:31:45", "type": "Automatic",
             "reason": "HA failover triggered - Health check failure on secondary", "role_change": "SECONDARY → PRIMARY"},
            {"timestamp": "2025-12-05T03:15:22", "type": "Manual",
             "reason": "Administrator initiated failover for maintenance", "role_change": "PRIMARY → SECONDARY"},
        ]})
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn filter_set(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().filter(|f| !f.is_empty())
}

#[async_trait]
impl TelemetrySource for DemoBackend {
    async fn system_stats(&self, node: Node) -> Envelope<Value> {
        Envelope::success(Self::stats(node))
    }

    async fn ha_status(&self) -> Envelope<Value> {
        Envelope::success(Self::ha_nodes())
    }
}

#[async_trait]
impl ApplianceApi for DemoBackend {
    async fn capabilities(&self) -> Envelope<Capabilities> {
        Envelope::success(Capabilities::default())
    }

    async fn applications(&self, _node: Node) -> Envelope<Vec<Application>> {
        Envelope::success(normalize::applications(&Self::applications()))
    }

    async fn services(&self, _node: Node) -> Envelope<ServiceInventory> {
        Envelope::success(normalize::services(&Self::services()))
    }

    async fn failover_history(&self, query: &FailoverQuery) -> Envelope<Vec<FailoverEvent>> {
        let mut events = normalize::failover_events(&Self::failover_events());
        if let Some(kind) = filter_set(&query.kind) {
            events.retain(|e| contains_ci(&e.kind, kind));
        }
        Envelope::success(events)
    }

    async fn user_sessions(&self, query: &SessionQuery) -> Envelope<Vec<UserSession>> {
        let mut sessions = normalize::user_sessions(&Self::sessions());
        if let Some(user) = filter_set(&query.user) {
            sessions.retain(|s| contains_ci(&s.user, user));
        }
        if let Some(kind) = filter_set(&query.kind) {
            sessions.retain(|s| contains_ci(&s.kind, kind));
        }
        if let Some(status) = filter_set(&query.status) {
            sessions.retain(|s| s.status.eq_ignore_ascii_case(status));
        }
        sessions.retain(|s| s.node == query.node.as_str());
        Envelope::success(sessions)
    }

    async fn unlock_user(&self, _node: Node, username: &str) -> Envelope<UnlockOutcome> {
        let outcome = if username.eq_ignore_ascii_case("test") {
            UnlockOutcome {
                success: false,
                message: format!("User '{}' not found", username),
            }
        } else {
            UnlockOutcome {
                success: true,
                message: format!("Account '{}' has been unlocked successfully", username),
            }
        };
        tokio::time::sleep(self.unlock_delay).await;
        Envelope::success(outcome)
    }

    async fn export_csv(&self, request: &ExportRequest) -> Envelope<String> {
        let csv = match request {
            ExportRequest::FailoverHistory(query) => self
                .failover_history(query)
                .await
                .into_result()
                .map(|events| failover_csv(&events)),
            ExportRequest::UserSessions(query) => self
                .user_sessions(query)
                .await
                .into_result()
                .map(|sessions| sessions_csv(&sessions)),
        };
        Envelope::from_result(csv)
    }

    fn telemetry(self: Arc<Self>) -> Arc<dyn TelemetrySource> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::HaRole;

    #[tokio::test]
    async fn test_demo_stats_jitter_within_bounds() {
        let demo = DemoBackend::new();
        for _ in 0..50 {
            let snap = normalize::snapshot(&demo.system_stats(Node::Primary).await.into_result().unwrap());
            assert!((21.0..=26.0).contains(&snap.cpu_percent), "cpu {}", snap.cpu_percent);
            assert_eq!(snap.mem_percent, 45.2);
            assert!((1147.0..=1347.0).contains(&snap.http_request_rate));
            assert_eq!(snap.identity.ha_role, HaRole::Primary);

            let secondary =
                normalize::snapshot(&demo.system_stats(Node::Secondary).await.into_result().unwrap());
            assert!(secondary.http_request_rate >= 0.0);
            assert!(secondary.cpu_percent >= 0.0);
        }
    }

    #[tokio::test]
    async fn test_demo_session_filters() {
        let demo = DemoBackend::new();
        let all = demo
            .user_sessions(&SessionQuery::for_node(Node::Primary))
            .await
            .into_result()
            .unwrap();
        assert_eq!(all.len(), 3);

        let query = SessionQuery {
            user: Some("JANE".to_string()),
            ..SessionQuery::for_node(Node::Primary)
        };
        let jane = demo.user_sessions(&query).await.into_result().unwrap();
        assert_eq!(jane.len(), 1);
        assert_eq!(jane[0].user, "jane.smith@company.com");

        let terminated = SessionQuery {
            status: Some("terminated".to_string()),
            ..SessionQuery::for_node(Node::Secondary)
        };
        assert_eq!(demo.user_sessions(&terminated).await.into_result().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_demo_services_and_export() {
        let demo = DemoBackend::new();
        let inventory = demo.services(Node::Primary).await.into_result().unwrap();
        assert_eq!(inventory.services.len(), 5);
        assert_eq!(inventory.services[2].state, "DOWN");
        assert_eq!(inventory.groups.len(), 1);

        let request = ExportRequest::UserSessions(SessionQuery {
            kind: Some("vpn".to_string()),
            ..SessionQuery::for_node(Node::Primary)
        });
        let csv = demo.export_csv(&request).await.into_result().unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "user,type,status,duration,ip,node,start");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("john.doe@company.com,VPN,Active"));
    }

    #[tokio::test]
    async fn test_demo_failover_filter_and_unlock() {
        let demo = DemoBackend::new().with_unlock_delay(Duration::ZERO);
        let query = FailoverQuery {
            kind: Some("manual".to_string()),
            ..FailoverQuery::for_node(Node::Primary)
        };
        let events = demo.failover_history(&query).await.into_result().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].role_change, "PRIMARY → SECONDARY");

        let denied = demo.unlock_user(Node::Primary, "test").await.into_result().unwrap();
        assert!(!denied.success);
        let unlocked = demo.unlock_user(Node::Primary, "bob").await.into_result().unwrap();
        assert!(unlocked.success);
    }
}
