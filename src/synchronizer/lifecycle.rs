//! Engine lifecycle: bring-up, scheduler control, shutdown.

use std::sync::Arc;

use tracing::{info, warn};

use crate::fanout::{fan_out, AggregateResult};
use crate::pillar::PillarStats;
use crate::scheduler::spawn_sync_loop;

use super::{EngineState, MemorySynchronizer};

impl MemorySynchronizer {
    /// Bring all registered pillars online with a concurrent fan-out
    /// `connect`.
    ///
    /// The engine becomes usable even when some pillars fail bring-up:
    /// failed pillars land `Offline` and are retried on each scheduled sync
    /// cycle. The returned aggregate tells the caller which pillars made it.
    #[tracing::instrument(skip(self), fields(pillars = self.registry.len()))]
    pub async fn initialize(&self) -> AggregateResult<PillarStats> {
        let _ = self.state.send(EngineState::Initializing);
        info!(pillars = self.registry.len(), "Initializing memory pillars...");

        let limit = self.config.connect_timeout();
        crate::metrics::record_fanout_targets("connect", self.registry.len());
        let aggregate = fan_out("connect", self.registry.handles().to_vec(), move |h| {
            async move { h.connect(limit).await }
        })
        .await;

        for result in &aggregate.results {
            if let Err(e) = &result.outcome {
                warn!(pillar = %result.pillar, error = %e, "Pillar failed bring-up, will retry on sync cycles");
            }
        }
        crate::metrics::set_pillars_online(self.online_count());

        let _ = self.state.send(EngineState::Ready);
        if aggregate.overall_success() {
            info!(
                online = aggregate.succeeded(),
                offline = aggregate.failed(),
                "Memory pillars online"
            );
        } else {
            warn!("No pillar came online - engine running in degraded form");
        }
        aggregate
    }

    /// Start the background sync scheduler.
    ///
    /// The first cycle runs immediately, then every
    /// `config.sync_interval_secs`. Idempotent: a second call while the
    /// scheduler is running is a no-op.
    pub fn start_scheduler(self: &Arc<Self>) {
        let mut slot = self.scheduler.lock();
        if slot.is_some() {
            return;
        }
        info!(
            interval_secs = self.config.sync_interval_secs,
            "Starting sync scheduler"
        );
        *slot = Some(spawn_sync_loop(Arc::clone(self), self.config.sync_interval()));
    }

    /// Ask the scheduler to run a sync cycle now instead of waiting for the
    /// next interval tick. No-op when the scheduler is not running.
    pub fn trigger_sync(&self) {
        if let Some(handle) = self.scheduler.lock().as_ref() {
            handle.trigger();
        }
    }

    /// Tear the engine down: cancel the scheduler and wait for its in-flight
    /// cycle to finish. Per-pillar locks are scoped guards, so cancellation
    /// cannot leave one held.
    #[tracing::instrument(skip(self))]
    pub async fn shutdown(&self) {
        let _ = self.state.send(EngineState::ShuttingDown);
        let handle = self.scheduler.lock().take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
        info!("Memory synchronizer shut down");
    }
}
