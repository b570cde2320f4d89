//! Background sync scheduler.
//!
//! A single cancellable task that drives [`sync_all`] on an interval. The
//! loop also listens on a manual trigger (used by `trigger_sync()` and by
//! tests, which drive cycles explicitly instead of sleeping) and on a
//! shutdown channel, so teardown is immediate and clean - no
//! `while true: sleep` loop to orphan.
//!
//! [`sync_all`]: crate::MemorySynchronizer::sync_all

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::synchronizer::MemorySynchronizer;

/// Control handle for the running sync loop.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) aborts
/// nothing; the owning [`MemorySynchronizer`] keeps it and tears it down on
/// engine shutdown.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    trigger: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Request an immediate sync cycle.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Cancel the loop and wait for any in-flight cycle to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Spawn the sync loop. The first cycle runs immediately (the original
/// bring-up behavior: one full sync before the steady interval kicks in).
pub(crate) fn spawn_sync_loop(
    engine: Arc<MemorySynchronizer>,
    interval: Duration,
) -> SchedulerHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let trigger = Arc::new(Notify::new());
    let loop_trigger = Arc::clone(&trigger);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    debug!("Scheduled sync cycle");
                    engine.sync_all().await;
                }
                _ = loop_trigger.notified() => {
                    debug!("Triggered sync cycle");
                    engine.sync_all().await;
                }
                _ = shutdown_rx.changed() => {
                    break;
                }
            }
        }
        info!("Sync scheduler stopped");
    });

    SchedulerHandle {
        shutdown: shutdown_tx,
        trigger,
        task,
    }
}
