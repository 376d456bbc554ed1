//! Scripted telemetry source for testing.
//!
//! Responses are queued per node and consumed in call order; when the queue
//! is empty the node's default response is returned. A gated response holds
//! the fetch open until the test releases it, which is how in-flight requests
//! racing a node switch or a disposal are simulated.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::oneshot;

use super::{Envelope, Node, TelemetrySource};

enum Scripted {
    Stats(Value),
    Failure(String),
    Gated {
        gate: oneshot::Receiver<()>,
        stats: Value,
    },
}

#[derive(Default)]
struct MockState {
    defaults: HashMap<Node, Value>,
    queued: HashMap<Node, VecDeque<Scripted>>,
    calls: HashMap<Node, usize>,
    ha: Option<Value>,
}

/// Telemetry source with scripted per-node responses.
#[derive(Default)]
pub struct MockSource {
    state: Mutex<MockState>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a system-stats payload in the appliance's nested wire shape.
    pub fn stats_json(cpu: f64, mem: f64, http_rate: f64) -> Value {
        json!({
            "ip": "10.0.0.1",
            "hostname": "mock",
            "version": "mock-1.0",
            "ha_role": "STANDALONE",
            "ns_stats": {"ns": {"cpuusagepcnt": cpu, "memusagepcnt": mem, "httprequestsrate": http_rate}},
        })
    }

    /// Sets the response returned once the node's queue is empty.
    pub fn with_stats(self, node: Node, stats: Value) -> Self {
        self.lock().defaults.insert(node, stats);
        self
    }

    /// Sets the HA status payload (default: empty node list).
    pub fn with_ha(self, ha: Value) -> Self {
        self.lock().ha = Some(ha);
        self
    }

    pub fn push_stats(&self, node: Node, stats: Value) {
        self.enqueue(node, Scripted::Stats(stats));
    }

    pub fn push_failure(&self, node: Node, error: &str) {
        self.enqueue(node, Scripted::Failure(error.to_string()));
    }

    /// Queues a response that resolves only after the returned sender fires
    /// (or is dropped).
    pub fn push_gated(&self, node: Node, stats: Value) -> oneshot::Sender<()> {
        let (tx, gate) = oneshot::channel();
        self.enqueue(node, Scripted::Gated { gate, stats });
        tx
    }

    /// Number of `system_stats` calls issued for `node`.
    pub fn calls(&self, node: Node) -> usize {
        self.lock().calls.get(&node).copied().unwrap_or(0)
    }

    fn enqueue(&self, node: Node, scripted: Scripted) {
        self.lock().queued.entry(node).or_default().push_back(scripted);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TelemetrySource for MockSource {
    async fn system_stats(&self, node: Node) -> Envelope<Value> {
        let next = {
            let mut state = self.lock();
            *state.calls.entry(node).or_default() += 1;
            match state.queued.get_mut(&node).and_then(VecDeque::pop_front) {
                Some(scripted) => scripted,
                None => match state.defaults.get(&node) {
                    Some(stats) => Scripted::Stats(stats.clone()),
                    None => Scripted::Failure(format!("no scripted response for {}", node)),
                },
            }
        };

        match next {
            Scripted::Stats(stats) => Envelope::success(stats),
            Scripted::Failure(error) => Envelope::failure(error),
            Scripted::Gated { gate, stats } => {
                let _ = gate.await;
                Envelope::success(stats)
            }
        }
    }

    async fn ha_status(&self) -> Envelope<Value> {
        let ha = self.lock().ha.clone();
        Envelope::success(ha.unwrap_or_else(|| json!({"hanode": []})))
    }
}
