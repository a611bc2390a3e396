//! AutoService implementation

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::config::ServiceConfig;
use crate::domain::Patient;
use crate::queue::{QueueError, SharedQueue};

/// Outcome of one automatic dequeue
#[derive(Debug, Clone)]
pub struct ServiceEvent {
    /// 1-based round number
    pub tick: u64,
    pub outcome: Result<Patient, QueueError>,
    /// Queue contents right after the dequeue, head to tail
    pub queue: Vec<Patient>,
}

/// Totals reported when the service stops
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSummary {
    pub ticks: u64,
    pub served: u64,
}

/// Serves patients from a shared queue on a fixed interval
///
/// Each round locks the queue for one dequeue plus a snapshot and releases it
/// before sleeping, so other holders of the queue can interleave between
/// rounds. The shutdown signal is observed only between rounds.
pub struct AutoService {
    config: ServiceConfig,
    queue: SharedQueue,
    max_ticks: Option<u64>,
}

impl AutoService {
    /// Create a new AutoService
    pub fn new(config: ServiceConfig, queue: SharedQueue) -> Self {
        debug!(?config, "AutoService::new: called");
        Self {
            config,
            queue,
            max_ticks: None,
        }
    }

    /// Stop after `max_ticks` rounds; `None` runs until shutdown
    pub fn with_max_ticks(mut self, max_ticks: Option<u64>) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Run one round
    async fn tick(&self, tick: u64) -> ServiceEvent {
        let mut queue = self.queue.lock().await;
        let outcome = queue.dequeue();
        let snapshot = queue.snapshot().cloned().collect();
        ServiceEvent {
            tick,
            outcome,
            queue: snapshot,
        }
    }

    fn ticks_exhausted(&self, ticks: u64) -> bool {
        self.max_ticks.is_some_and(|max| ticks >= max)
    }

    /// Run the service loop
    ///
    /// Stops when `shutdown` becomes true or its sender is dropped, when the
    /// event receiver is dropped, after `max_ticks` rounds, or on an empty
    /// queue if `stop_when_empty` is set.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>, events: mpsc::Sender<ServiceEvent>) -> ServiceSummary {
        info!(
            interval_ms = self.config.interval_ms,
            max_ticks = ?self.max_ticks,
            "AutoService started"
        );

        let mut summary = ServiceSummary::default();
        loop {
            if *shutdown.borrow() || self.ticks_exhausted(summary.ticks) {
                break;
            }

            let event = self.tick(summary.ticks + 1).await;
            summary.ticks += 1;
            if event.outcome.is_ok() {
                summary.served += 1;
            }
            let drained =
                self.config.stop_when_empty && event.outcome.as_ref().is_err_and(QueueError::is_empty_queue);
            debug!(tick = event.tick, outcome = ?event.outcome, "AutoService::run: round complete");

            if events.send(event).await.is_err() {
                warn!("AutoService event receiver dropped, stopping");
                break;
            }
            if drained {
                debug!("AutoService::run: queue drained");
                break;
            }
            if self.ticks_exhausted(summary.ticks) {
                break;
            }

            let stop = tokio::select! {
                _ = tokio::time::sleep(self.config.interval()) => false,
                changed = shutdown.changed() => changed.is_err(),
            };
            if stop {
                debug!("AutoService::run: shutdown sender dropped");
                break;
            }
        }

        info!(ticks = summary.ticks, served = summary.served, "AutoService stopped");
        summary
    }
}
