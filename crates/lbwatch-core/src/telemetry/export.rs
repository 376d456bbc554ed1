//! CSV export of the filtered failover and session lists.

use super::model::{FailoverEvent, FailoverQuery, SessionQuery, UserSession};
use super::Node;

/// Which list to export, with its filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportRequest {
    FailoverHistory(FailoverQuery),
    UserSessions(SessionQuery),
}

impl ExportRequest {
    /// REST endpoint serving the CSV.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ExportRequest::FailoverHistory(_) => "/api/export/failover-history",
            ExportRequest::UserSessions(_) => "/api/export/user-sessions",
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            ExportRequest::FailoverHistory(query) => query.params(),
            ExportRequest::UserSessions(query) => query.params(),
        }
    }

    pub fn node(&self) -> Node {
        match self {
            ExportRequest::FailoverHistory(query) => query.node,
            ExportRequest::UserSessions(query) => query.node,
        }
    }

    /// File name for a download taken at `stamp` (e.g. `20251208-091500`).
    pub fn file_name(&self, stamp: &str) -> String {
        let stem = match self {
            ExportRequest::FailoverHistory(_) => "failover-history",
            ExportRequest::UserSessions(_) => "user-sessions",
        };
        format!("{}-{}-{}.csv", stem, self.node(), stamp)
    }
}

pub fn failover_csv(events: &[FailoverEvent]) -> String {
    build_csv(
        &["timestamp", "type", "reason", "role_change"],
        events.iter().map(|e| {
            vec![
                e.timestamp.as_str(),
                e.kind.as_str(),
                e.reason.as_str(),
                e.role_change.as_str(),
            ]
        }),
    )
}

pub fn sessions_csv(sessions: &[UserSession]) -> String {
    build_csv(
        &["user", "type", "status", "duration", "ip", "node", "start"],
        sessions.iter().map(|s| {
            vec![
                s.user.as_str(),
                s.kind.as_str(),
                s.status.as_str(),
                s.duration.as_str(),
                s.ip.as_str(),
                s.node.as_str(),
                s.start.as_str(),
            ]
        }),
    )
}

fn build_csv<'a>(header: &[&str], rows: impl Iterator<Item = Vec<&'a str>>) -> String {
    let mut csv = header.join(",");
    csv.push('\n');
    for row in rows {
        let line = row
            .into_iter()
            .map(escape_csv)
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }
    csv
}

fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
