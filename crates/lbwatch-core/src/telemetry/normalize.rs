//! Mapping from loosely-typed wire payloads to strict records.
//!
//! The appliance reports the same concept under several spellings depending
//! on firmware and API mode (`cpuusagepcnt` vs `cpuusage`, `ipaddress` vs
//! `ip`, ...). All of that knowledge lives here; nothing downstream looks at
//! raw JSON. Missing or malformed numbers become `0`, missing text becomes
//! an empty string.

use serde_json::Value;

use super::model::{
    Application, Capabilities, FailoverEvent, HaNode, HaRole, NodeIdentity, Service, ServiceGroup,
    ServiceInventory, TelemetrySnapshot, UnlockOutcome, UserSession,
};

const CPU_KEYS: &[&str] = &["cpuPercent", "cpuusagepcnt", "cpuusage"];
const MEM_KEYS: &[&str] = &["memPercent", "memusagepcnt", "memusagepct"];
const HTTP_RATE_KEYS: &[&str] = &["httpRequestRate", "httprequestsrate"];

/// Builds a snapshot from a system-stats payload.
///
/// Counters are looked up in `ns_stats.ns` first, then at the top level.
pub fn snapshot(raw: &Value) -> TelemetrySnapshot {
    let ns = raw.pointer("/ns_stats/ns").unwrap_or(&Value::Null);
    let scopes = [ns, raw];
    let identity = raw.get("identity").unwrap_or(raw);

    TelemetrySnapshot {
        cpu_percent: number_in(&scopes, CPU_KEYS),
        mem_percent: number_in(&scopes, MEM_KEYS),
        http_request_rate: number_in(&scopes, HTTP_RATE_KEYS),
        identity: NodeIdentity {
            ip: text(identity, &["ip", "ipaddress"]),
            hostname: text(identity, &["hostname"]),
            version: text(identity, &["version"]),
            ha_role: HaRole::classify(&text(identity, &["ha_role", "haRole"])),
        },
    }
}

/// HA node list from `{ "hanode": [...] }` or a bare array.
pub fn ha_nodes(raw: &Value) -> Vec<HaNode> {
    list(raw, &["hanode"])
        .iter()
        .map(|n| HaNode {
            ip: text(n, &["ipaddress", "ip"]),
            hostname: text(n, &["hostname"]),
            state: text(n, &["state", "hacurstate"]),
            sync_status: text(n, &["hasync", "syncStatus"]),
        })
        .collect()
}

pub fn applications(raw: &Value) -> Vec<Application> {
    list(raw, &["applications", "lbvserver"])
        .iter()
        .map(|a| Application {
            name: text(a, &["name", "vservername"]),
            vip: text(a, &["ipv46", "ipaddress", "vip"]),
            port: port(a),
            state: text(a, &["curstate", "state"]),
        })
        .collect()
}

/// Services and service groups from `{ "service": [...], "servicegroup": [...] }`.
///
/// Either list may be absent.
pub fn services(raw: &Value) -> ServiceInventory {
    let services = list_field(raw, &["service", "services"])
        .iter()
        .map(|s| Service {
            name: text(s, &["name", "servicename"]),
            ip: text(s, &["ip", "ipaddress"]),
            port: port(s),
            service_type: text(s, &["servicetype"]),
            state: text(s, &["curstate", "svrstate", "state"]),
        })
        .collect();
    let groups = list_field(raw, &["servicegroup", "serviceGroups"])
        .iter()
        .map(|g| ServiceGroup {
            name: text(g, &["name", "servicegroupname"]),
            service_type: text(g, &["servicetype"]),
            state: text(g, &["state", "curstate"]),
            bound_members: first(g, &["numbound", "numofboundmembers"])
                .map(coerce_number)
                .filter(|n| *n >= 0.0)
                .map(|n| n.min(f64::from(u32::MAX)) as u32)
                .unwrap_or(0),
        })
        .collect();
    ServiceInventory { services, groups }
}

pub fn failover_events(raw: &Value) -> Vec<FailoverEvent> {
    list(raw, &["events"])
        .iter()
        .map(|e| FailoverEvent {
            timestamp: text(e, &["timestamp"]),
            kind: text(e, &["type"]),
            reason: text(e, &["reason"]),
            role_change: text(e, &["role_change"]),
        })
        .collect()
}

pub fn user_sessions(raw: &Value) -> Vec<UserSession> {
    list(raw, &["sessions"])
        .iter()
        .map(|s| UserSession {
            user: text(s, &["user"]),
            kind: text(s, &["type"]),
            status: text(s, &["status"]),
            duration: text(s, &["duration"]),
            ip: text(s, &["ip"]),
            node: text(s, &["node"]),
            start: text(s, &["start"]),
        })
        .collect()
}

pub fn capabilities(raw: &Value) -> Capabilities {
    let defaults = Capabilities::default();
    let modes = raw.get("api_mode").unwrap_or(&Value::Null);
    let mode = |key: &str, fallback: String| {
        let value = text(modes, &[key]);
        if value.is_empty() { fallback } else { value }
    };
    Capabilities {
        primary_mode: mode("primary", defaults.primary_mode),
        secondary_mode: mode("secondary", defaults.secondary_mode),
    }
}

pub fn unlock_outcome(raw: &Value, username: &str) -> UnlockOutcome {
    let success = raw.get("success").and_then(Value::as_bool).unwrap_or(false);
    let message = [text(raw, &["message"]), text(raw, &["error"])]
        .into_iter()
        .find(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if success {
                format!("Account '{}' has been unlocked", username)
            } else {
                format!("Failed to unlock account '{}'", username)
            }
        });
    UnlockOutcome { success, message }
}

/// Coerces a JSON value to a finite float, defaulting to `0`.
///
/// Numbers pass through; strings are parsed by their leading numeric prefix
/// (`"23.5%"` → `23.5`); everything else is `0`.
pub fn coerce_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn number_in(scopes: &[&Value], keys: &[&str]) -> f64 {
    scopes
        .iter()
        .find_map(|scope| first(scope, keys))
        .map(coerce_number)
        .unwrap_or(0.0)
}

/// First present, non-null value among `keys`.
fn first<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

fn text(obj: &Value, keys: &[&str]) -> String {
    match first(obj, keys) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn list<'a>(raw: &'a Value, keys: &[&str]) -> &'a [Value] {
    if let Value::Array(items) = raw {
        return items;
    }
    list_field(raw, keys)
}

fn list_field<'a>(raw: &'a Value, keys: &[&str]) -> &'a [Value] {
    first(raw, keys)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn port(obj: &Value) -> Option<u16> {
    first(obj, &["port"])
        .map(coerce_number)
        .filter(|p| *p > 0.0 && *p <= f64::from(u16::MAX))
        .map(|p| p as u16)
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        digits += frac - (end + 1);
        if digits > 0 {
            end = frac;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > exp_digits {
            end = exp;
        }
    }
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_nested_appliance_spelling() {
        let raw = json!({
            "ip": "10.0.0.100",
            "version": "14.1-29.63",
            "ha_role": "PRIMARY",
            "hostname": "ns-primary-01",
            "ns_stats": {"ns": {"cpuusagepcnt": 23.5, "memusagepcnt": 45.2, "httprequestsrate": 1247}}
        });
        let snap = snapshot(&raw);
        assert_eq!(snap.cpu_percent, 23.5);
        assert_eq!(snap.mem_percent, 45.2);
        assert_eq!(snap.http_request_rate, 1247.0);
        assert_eq!(snap.identity.ip, "10.0.0.100");
        assert_eq!(snap.identity.hostname, "ns-primary-01");
        assert_eq!(snap.identity.ha_role, HaRole::Primary);
    }

    #[test]
    fn test_snapshot_alternate_spellings() {
        let raw = json!({
            "ns_stats": {"ns": {"cpuusage": "12.5", "memusagepct": "40%"}},
            "httpRequestRate": 300
        });
        let snap = snapshot(&raw);
        assert_eq!(snap.cpu_percent, 12.5);
        assert_eq!(snap.mem_percent, 40.0);
        assert_eq!(snap.http_request_rate, 300.0);
    }

    #[test]
    fn test_snapshot_flat_camel_case() {
        let raw = json!({
            "cpuPercent": 5.0,
            "memPercent": 6.0,
            "httpRequestRate": 7.0,
            "identity": {"ip": "1.2.3.4", "hostname": "lb", "version": "1", "haRole": "standalone"}
        });
        let snap = snapshot(&raw);
        assert_eq!(
            (snap.cpu_percent, snap.mem_percent, snap.http_request_rate),
            (5.0, 6.0, 7.0)
        );
        assert_eq!(snap.identity.ip, "1.2.3.4");
        assert_eq!(snap.identity.ha_role, HaRole::Standalone);
    }

    #[test]
    fn test_snapshot_missing_and_malformed_default_to_zero() {
        let snap = snapshot(&json!({"ns_stats": {"ns": {"cpuusagepcnt": "n/a", "memusagepcnt": null}}}));
        assert_eq!(snap.cpu_percent, 0.0);
        assert_eq!(snap.mem_percent, 0.0);
        assert_eq!(snap.http_request_rate, 0.0);
        assert_eq!(snap.identity, NodeIdentity::default());

        assert_eq!(snapshot(&json!("garbage")), TelemetrySnapshot::default());
        assert_eq!(snapshot(&Value::Null), TelemetrySnapshot::default());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(1.5)), 1.5);
        assert_eq!(coerce_number(&json!(" 42abc")), 42.0);
        assert_eq!(coerce_number(&json!("-3.5e2x")), -350.0);
        assert_eq!(coerce_number(&json!(".5")), 0.5);
        assert_eq!(coerce_number(&json!("abc")), 0.0);
        assert_eq!(coerce_number(&json!("-")), 0.0);
        assert_eq!(coerce_number(&json!(true)), 0.0);
        assert_eq!(coerce_number(&json!([1])), 0.0);
    }

    #[test]
    fn test_ha_nodes_spellings() {
        let raw = json!({"hanode": [
            {"ipaddress": "10.0.0.100", "hostname": "a", "state": "PRIMARY", "hasync": "SUCCESS"},
            {"ip": "10.0.0.200", "hacurstate": "UP"}
        ]});
        let nodes = ha_nodes(&raw);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].ip, "10.0.0.100");
        assert_eq!(nodes[0].sync_status, "SUCCESS");
        assert_eq!(nodes[1].ip, "10.0.0.200");
        assert_eq!(nodes[1].state, "UP");
        assert_eq!(nodes[1].hostname, "");

        assert!(ha_nodes(&json!({})).is_empty());
    }

    #[test]
    fn test_applications_spellings() {
        let raw = json!({"lbvserver": [
            {"vservername": "vs_web", "ipaddress": "192.168.1.1", "port": "443", "state": "UP"},
            {"name": "vs_dns", "vip": "192.168.1.2", "port": 0, "curstate": "DOWN"}
        ]});
        let apps = applications(&raw);
        assert_eq!(apps[0].name, "vs_web");
        assert_eq!(apps[0].port, Some(443));
        assert_eq!(apps[1].vip, "192.168.1.2");
        assert_eq!(apps[1].port, None);
        assert_eq!(apps[1].state, "DOWN");
    }

    #[test]
    fn test_services_and_groups() {
        let raw = json!({
            "service": [
                {"name": "svc_web1", "ip": "10.10.1.10", "port": 80, "curstate": "UP", "servicetype": "HTTP"},
                {"servicename": "svc_api", "ipaddress": "10.10.2.10", "port": "8080", "svrstate": "DOWN"}
            ],
            "servicegroup": [
                {"servicegroupname": "sg_web", "servicetype": "HTTP", "state": "ENABLED", "numbound": "3"}
            ]
        });
        let inventory = services(&raw);
        assert_eq!(inventory.len(), 3);
        assert_eq!(inventory.services[0].service_type, "HTTP");
        assert_eq!(inventory.services[1].name, "svc_api");
        assert_eq!(inventory.services[1].port, Some(8080));
        assert_eq!(inventory.services[1].state, "DOWN");
        assert_eq!(inventory.groups[0].name, "sg_web");
        assert_eq!(inventory.groups[0].bound_members, 3);

        let only_services = services(&json!({"service": [{"name": "a"}]}));
        assert_eq!(only_services.services.len(), 1);
        assert!(only_services.groups.is_empty());
        assert!(services(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_capabilities_and_unlock() {
        let caps = capabilities(&json!({"api_mode": {"primary": "ssh"}}));
        assert_eq!(caps.primary_mode, "ssh");
        assert_eq!(caps.secondary_mode, "nitro");

        let ok = unlock_outcome(&json!({"success": true}), "bob");
        assert!(ok.success);
        assert!(ok.message.contains("bob"));

        let failed = unlock_outcome(&json!({"success": false, "error": "User 'x' not found"}), "x");
        assert!(!failed.success);
        assert_eq!(failed.message, "User 'x' not found");
    }
}
