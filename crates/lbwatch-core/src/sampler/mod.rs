//! Live-metric sampling for the overview.
//!
//! The [`Sampler`] owns at most one [`PollSession`] and the derived
//! [`LiveMetrics`]. Fetch results travel back over a channel as
//! [`SampleUpdate`]s tagged with the epoch of the session that issued them;
//! the owner hands each one to [`Sampler::apply`], which drops anything whose
//! epoch is no longer current. That check is what keeps a late response for
//! the previous node (or a disposed view) from overwriting current state.

mod session;

pub use session::PollSession;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::history::MetricHistory;
use crate::telemetry::{HaNode, Node, NodeIdentity, TelemetrySnapshot, TelemetrySource, normalize};

/// Lower bound for the polling cadence (`tokio::time::interval` rejects zero).
const MIN_CADENCE: Duration = Duration::from_millis(100);

/// Result of one poll, as delivered to the sampler's owner.
#[derive(Debug)]
pub struct SampleUpdate {
    pub epoch: u64,
    pub node: Node,
    pub stats: Result<TelemetrySnapshot, FetchError>,
    pub ha: Result<Vec<HaNode>, FetchError>,
}

/// Receiving half of the sampler's update channel.
pub type SampleUpdates = UnboundedReceiver<SampleUpdate>;

/// What [`Sampler::apply`] did with an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Issued by a disposed or replaced session; discarded.
    Stale,
    /// Current, but nothing visible changed (e.g. a failed fetch).
    Unchanged,
    /// Current and applied; views should redraw.
    Updated,
}

/// Derived scalar state of the monitored node.
#[derive(Debug, Clone, Default)]
pub struct LiveMetrics {
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub http_request_rate: f64,
    /// Request-rate window fed once per accepted poll.
    pub history: MetricHistory,
    pub identity: Option<NodeIdentity>,
    pub ha_nodes: Vec<HaNode>,
    /// `true` until the first result of the current session arrives.
    pub loading: bool,
    /// Bumped on every visible change; never goes backwards.
    pub revision: u64,
    pub last_sample_at: Option<DateTime<Local>>,
    pub consecutive_failures: u32,
}

impl LiveMetrics {
    fn reset(&mut self) {
        let revision = self.revision + 1;
        *self = LiveMetrics {
            revision,
            ..LiveMetrics::default()
        };
    }

    fn absorb(&mut self, snapshot: TelemetrySnapshot) {
        self.cpu_percent = snapshot.cpu_percent;
        self.mem_percent = snapshot.mem_percent;
        self.http_request_rate = snapshot.http_request_rate;
        self.history = std::mem::take(&mut self.history).push(snapshot.http_request_rate);
        self.identity = Some(snapshot.identity);
        self.last_sample_at = Some(Local::now());
        self.consecutive_failures = 0;
    }
}

/// Polls one node at a fixed cadence and maintains [`LiveMetrics`].
pub struct Sampler {
    source: Arc<dyn TelemetrySource>,
    cadence: Duration,
    tx: UnboundedSender<SampleUpdate>,
    next_epoch: u64,
    session: Option<PollSession>,
    metrics: LiveMetrics,
}

impl Sampler {
    /// Creates an idle sampler and the channel its results arrive on.
    pub fn new(source: Arc<dyn TelemetrySource>, cadence: Duration) -> (Self, SampleUpdates) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sampler = Self {
            source,
            cadence: cadence.max(MIN_CADENCE),
            tx,
            next_epoch: 0,
            session: None,
            metrics: LiveMetrics::default(),
        };
        (sampler, rx)
    }

    /// Starts sampling `node`: fetch now, then every cadence.
    ///
    /// Any previous session is disposed first and the metrics (including the
    /// history window) are reset.
    pub fn start(&mut self, node: Node) {
        self.dispose_session();
        self.metrics.reset();
        self.metrics.loading = true;
        info!(%node, "sampling started");
        self.spawn_session(node);
    }

    /// Fetches immediately and restarts the cadence for the current node,
    /// keeping the history. No-op while stopped.
    pub fn refresh(&mut self) {
        let Some(node) = self.node() else {
            return;
        };
        self.dispose_session();
        debug!(%node, "manual refresh");
        self.spawn_session(node);
    }

    /// Disposes the session and clears all metrics.
    pub fn stop(&mut self) {
        if self.session.is_some() {
            info!("sampling stopped");
        }
        self.dispose_session();
        self.metrics.reset();
    }

    /// Applies an update if it belongs to the active session.
    pub fn apply(&mut self, update: SampleUpdate) -> Applied {
        let current = self.current_epoch();
        if current != Some(update.epoch) {
            debug!(
                node = %update.node,
                epoch = update.epoch,
                current = ?current,
                "discarding stale sample"
            );
            return Applied::Stale;
        }

        let mut changed = std::mem::replace(&mut self.metrics.loading, false);

        match update.stats {
            Ok(snapshot) => {
                self.metrics.absorb(snapshot);
                changed = true;
            }
            Err(e) => {
                self.metrics.consecutive_failures += 1;
                let failures = self.metrics.consecutive_failures;
                if failures == 1 {
                    warn!(node = %update.node, error = %e, "stats fetch failed, keeping last values");
                } else {
                    debug!(node = %update.node, error = %e, failures, "stats fetch failed again");
                }
            }
        }

        match update.ha {
            Ok(nodes) if nodes != self.metrics.ha_nodes => {
                self.metrics.ha_nodes = nodes;
                changed = true;
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "ha status fetch failed"),
        }

        if changed {
            self.metrics.revision += 1;
            Applied::Updated
        } else {
            Applied::Unchanged
        }
    }

    /// Applies every update already waiting in `updates`; returns `true` if
    /// any of them changed the metrics.
    pub fn drain(&mut self, updates: &mut SampleUpdates) -> bool {
        let mut changed = false;
        while let Ok(update) = updates.try_recv() {
            changed |= self.apply(update) == Applied::Updated;
        }
        changed
    }

    pub fn metrics(&self) -> &LiveMetrics {
        &self.metrics
    }

    /// Node of the active session.
    pub fn node(&self) -> Option<Node> {
        self.session.as_ref().map(PollSession::node)
    }

    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(PollSession::is_active)
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    fn current_epoch(&self) -> Option<u64> {
        self.session
            .as_ref()
            .filter(|s| s.is_active())
            .map(PollSession::epoch)
    }

    fn spawn_session(&mut self, node: Node) {
        self.next_epoch += 1;
        self.session = Some(PollSession::spawn(
            node,
            self.next_epoch,
            self.source.clone(),
            self.cadence,
            self.tx.clone(),
        ));
    }

    fn dispose_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.dispose();
        }
    }
}

/// Fetches stats and HA status concurrently and normalizes both.
pub(crate) async fn poll_once(source: &dyn TelemetrySource, node: Node, epoch: u64) -> SampleUpdate {
    let (stats, ha) = tokio::join!(source.system_stats(node), source.ha_status());
    SampleUpdate {
        epoch,
        node,
        stats: stats.into_result().map(|raw| normalize::snapshot(&raw)),
        ha: ha.into_result().map(|raw| normalize::ha_nodes(&raw)),
    }
}
