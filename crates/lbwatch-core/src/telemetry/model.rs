//! Strict telemetry and record types produced by normalization.

use serde::{Deserialize, Serialize};

use super::Node;

/// Node identity fields carried by a system-stats payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub ip: String,
    pub hostname: String,
    pub version: String,
    pub ha_role: HaRole,
}

/// Point-in-time telemetry read from one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub http_request_rate: f64,
    pub identity: NodeIdentity,
}

/// HA role of a node, classified from the appliance's free-form role string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaRole {
    Primary,
    Secondary,
    Standalone,
    Other(String),
    #[default]
    Unknown,
}

impl HaRole {
    /// Classifies by case-insensitive substring, e.g. `"Current: PRIMARY"`.
    pub fn classify(raw: &str) -> HaRole {
        let upper = raw.to_uppercase();
        if upper.contains("PRIMARY") {
            HaRole::Primary
        } else if upper.contains("SECONDARY") {
            HaRole::Secondary
        } else if upper.contains("STANDALONE") {
            HaRole::Standalone
        } else if raw.trim().is_empty() {
            HaRole::Unknown
        } else {
            HaRole::Other(raw.trim().to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            HaRole::Primary => "PRIMARY",
            HaRole::Secondary => "SECONDARY",
            HaRole::Standalone => "STANDALONE",
            HaRole::Other(s) => s,
            HaRole::Unknown => "Unknown",
        }
    }
}

/// One entry of the HA status list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HaNode {
    pub ip: String,
    pub hostname: String,
    pub state: String,
    pub sync_status: String,
}

/// Load-balancing virtual server ("application").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub vip: String,
    pub port: Option<u16>,
    pub state: String,
}

/// Backend service bound behind an application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub ip: String,
    pub port: Option<u16>,
    pub service_type: String,
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub name: String,
    pub service_type: String,
    pub state: String,
    pub bound_members: u32,
}

/// Services and service groups of one node, as listed on the Applications tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInventory {
    pub services: Vec<Service>,
    pub groups: Vec<ServiceGroup>,
}

impl ServiceInventory {
    pub fn len(&self) -> usize {
        self.services.len() + self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens into table rows: services first, then groups.
    pub fn into_rows(self) -> Vec<ServiceRow> {
        self.services
            .into_iter()
            .map(ServiceRow::Service)
            .chain(self.groups.into_iter().map(ServiceRow::Group))
            .collect()
    }
}

/// One row of the services table.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceRow {
    Service(Service),
    Group(ServiceGroup),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailoverEvent {
    pub timestamp: String,
    pub kind: String,
    pub reason: String,
    pub role_change: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub user: String,
    pub kind: String,
    pub status: String,
    pub duration: String,
    pub ip: String,
    pub node: String,
    pub start: String,
}

/// API mode per node (e.g. "nitro").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub primary_mode: String,
    pub secondary_mode: String,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            primary_mode: "nitro".to_string(),
            secondary_mode: "nitro".to_string(),
        }
    }
}

impl Capabilities {
    pub fn mode_for(&self, node: Node) -> &str {
        match node {
            Node::Primary => &self.primary_mode,
            Node::Secondary => &self.secondary_mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockOutcome {
    pub success: bool,
    pub message: String,
}

/// Operator-set filters of the failover and session lists.
///
/// The node is not part of the filter; it always follows the dashboard's
/// selected node. `from`/`to` are `YYYY-MM-DD` dates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub from: Option<String>,
    pub to: Option<String>,
    pub kind: Option<String>,
    pub user: Option<String>,
    pub status: Option<String>,
}

impl ListFilter {
    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    pub fn failover_query(&self, node: Node) -> FailoverQuery {
        FailoverQuery {
            node,
            from: self.from.clone(),
            to: self.to.clone(),
            kind: self.kind.clone(),
        }
    }

    pub fn session_query(&self, node: Node) -> SessionQuery {
        SessionQuery {
            node,
            from: self.from.clone(),
            to: self.to.clone(),
            user: self.user.clone(),
            kind: self.kind.clone(),
            status: self.status.clone(),
        }
    }

    /// Compact `key=value` rendering of the set fields, e.g.
    /// `from=2025-12-01 type=VPN`.
    pub fn summary(&self) -> String {
        self.pairs()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn pairs(&self) -> Vec<(&'static str, String)> {
        query_params(&[
            ("from", self.from.as_deref()),
            ("to", self.to.as_deref()),
            ("type", self.kind.as_deref()),
            ("user", self.user.as_deref()),
            ("status", self.status.as_deref()),
        ])
    }
}

/// Filters for the failover history endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailoverQuery {
    pub node: Node,
    pub from: Option<String>,
    pub to: Option<String>,
    pub kind: Option<String>,
}

impl FailoverQuery {
    pub fn for_node(node: Node) -> Self {
        Self {
            node,
            ..Self::default()
        }
    }

    /// Query parameters with empty values omitted.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        query_params(&[
            ("node", Some(self.node.as_str())),
            ("from", self.from.as_deref()),
            ("to", self.to.as_deref()),
            ("type", self.kind.as_deref()),
        ])
    }
}

/// Filters for the user sessions endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQuery {
    pub node: Node,
    pub from: Option<String>,
    pub to: Option<String>,
    pub user: Option<String>,
    pub kind: Option<String>,
    pub status: Option<String>,
}

impl SessionQuery {
    pub fn for_node(node: Node) -> Self {
        Self {
            node,
            ..Self::default()
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        query_params(&[
            ("node", Some(self.node.as_str())),
            ("from", self.from.as_deref()),
            ("to", self.to.as_deref()),
            ("user", self.user.as_deref()),
            ("type", self.kind.as_deref()),
            ("status", self.status.as_deref()),
        ])
    }
}

fn query_params(pairs: &[(&'static str, Option<&str>)]) -> Vec<(&'static str, String)> {
    pairs
        .iter()
        .filter_map(|(k, v)| match v {
            Some(v) if !v.is_empty() => Some((*k, v.to_string())),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ha_role_classify() {
        assert_eq!(HaRole::classify("PRIMARY"), HaRole::Primary);
        assert_eq!(HaRole::classify("Current: secondary"), HaRole::Secondary);
        assert_eq!(HaRole::classify("standalone"), HaRole::Standalone);
        assert_eq!(HaRole::classify(""), HaRole::Unknown);
        assert_eq!(
            HaRole::classify("CLAIMING"),
            HaRole::Other("CLAIMING".to_string())
        );
        assert_eq!(HaRole::classify("CLAIMING").label(), "CLAIMING");
    }

    #[test]
    fn test_list_filter_builds_queries() {
        let filter = ListFilter {
            from: Some("2025-12-01".to_string()),
            kind: Some("VPN".to_string()),
            user: Some(String::new()),
            status: Some("Active".to_string()),
            ..ListFilter::default()
        };
        assert!(!filter.is_empty());
        assert_eq!(filter.summary(), "from=2025-12-01 type=VPN status=Active");

        let failover = filter.failover_query(Node::Secondary);
        assert_eq!(
            failover.params(),
            vec![
                ("node", "secondary".to_string()),
                ("from", "2025-12-01".to_string()),
                ("type", "VPN".to_string()),
            ]
        );
        let sessions = filter.session_query(Node::Primary);
        assert_eq!(sessions.status.as_deref(), Some("Active"));
        assert_eq!(sessions.node, Node::Primary);

        assert!(ListFilter::default().is_empty());
        assert_eq!(ListFilter::default().summary(), "");
    }

    #[test]
    fn test_service_inventory_rows() {
        let inventory = ServiceInventory {
            services: vec![Service {
                name: "svc_web1".to_string(),
                ..Service::default()
            }],
            groups: vec![ServiceGroup {
                name: "sg_web".to_string(),
                ..ServiceGroup::default()
            }],
        };
        assert_eq!(inventory.len(), 2);
        let rows = inventory.into_rows();
        assert!(matches!(&rows[0], ServiceRow::Service(s) if s.name == "svc_web1"));
        assert!(matches!(&rows[1], ServiceRow::Group(g) if g.name == "sg_web"));
    }

    #[test]
    fn test_query_params_omit_empty() {
        let query = SessionQuery {
            node: Node::Secondary,
            user: Some("jane".to_string()),
            status: Some(String::new()),
            ..SessionQuery::default()
        };
        assert_eq!(
            query.params(),
            vec![("node", "secondary".to_string()), ("user", "jane".to_string())]
        );

        let failover = FailoverQuery {
            kind: Some("Manual".to_string()),
            ..FailoverQuery::for_node(Node::Primary)
        };
        assert_eq!(
            failover.params(),
            vec![("node", "primary".to_string()), ("type", "Manual".to_string())]
        );
    }
}
