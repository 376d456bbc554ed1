//! Poll session: one ticker task bound to one node and one epoch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use super::{SampleUpdate, poll_once};
use crate::telemetry::{Node, TelemetrySource};

/// Active periodic sampling of one node.
///
/// Owns the ticker task. Each tick spawns an independent fetch, so a slow
/// appliance can have several requests in flight; their results carry this
/// session's epoch and are only applied while the epoch is current.
pub struct PollSession {
    node: Node,
    epoch: u64,
    ticker: Option<JoinHandle<()>>,
}

impl PollSession {
    /// Starts ticking immediately and every `cadence` thereafter.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn spawn(
        node: Node,
        epoch: u64,
        source: Arc<dyn TelemetrySource>,
        cadence: Duration,
        tx: UnboundedSender<SampleUpdate>,
    ) -> Self {
        let ticker = tokio::spawn(run_ticker(node, epoch, source, cadence, tx));
        debug!(%node, epoch, cadence_ms = cadence.as_millis() as u64, "poll session started");
        Self {
            node,
            epoch,
            ticker: Some(ticker),
        }
    }

    pub fn node(&self) -> Node {
        self.node
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_active(&self) -> bool {
        self.ticker.is_some()
    }

    /// Stops future ticks. Idempotent.
    ///
    /// Fetches already in flight still complete and are delivered; the epoch
    /// check in [`Sampler::apply`](super::Sampler::apply) discards them.
    pub fn dispose(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
            debug!(node = %self.node, epoch = self.epoch, "poll session disposed");
        }
    }
}

impl Drop for PollSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_ticker(
    node: Node,
    epoch: u64,
    source: Arc<dyn TelemetrySource>,
    cadence: Duration,
    tx: UnboundedSender<SampleUpdate>,
) {
    let mut tick = tokio::time::interval(cadence);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tick.tick().await;
        if tx.is_closed() {
            break;
        }
        trace!(%node, epoch, "poll tick");

        let source = source.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let update = poll_once(source.as_ref(), node, epoch).await;
            let _ = tx.send(update);
        });
    }
}
