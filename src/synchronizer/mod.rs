//! Memory synchronizer.
//!
//! The [`MemorySynchronizer`] is the top-level orchestrator: it owns the
//! pillar registry and health state, routes reads and writes to the correct
//! pillar subset, fans operations out concurrently, and aggregates the
//! per-pillar outcomes.
//!
//! # Lifecycle
//!
//! ```text
//! Created → Initializing → Ready → ShuttingDown
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use memory_sync::{
//!     InMemoryPillar, MemorySynchronizer, PillarRegistry, SynchronizerConfig,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut registry = PillarRegistry::new();
//! registry.register(Arc::new(InMemoryPillar::new("redis", ["cache"]))).unwrap();
//! registry.register(Arc::new(InMemoryPillar::new("vault", ["secure"]))).unwrap();
//!
//! let engine = Arc::new(MemorySynchronizer::new(SynchronizerConfig::default(), registry));
//! let bring_up = engine.initialize().await;
//! assert!(bring_up.overall_success());
//!
//! engine.start_scheduler();
//! // ... query/store/flush ...
//! engine.shutdown().await;
//! # }
//! ```

mod types;
mod lifecycle;
mod ops;

pub use types::{EngineState, SyncOutcome};

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::config::SynchronizerConfig;
use crate::health::{PillarSnapshot, PillarState};
use crate::registry::{PillarHandle, PillarRegistry};
use crate::scheduler::SchedulerHandle;

/// Top-level multi-pillar memory engine.
///
/// Constructed once at process start with a frozen registry, shared via
/// `Arc`, and torn down with [`shutdown()`](Self::shutdown). Pillars never
/// reference the synchronizer back; all coordination is top-down through the
/// fan-out executor.
pub struct MemorySynchronizer {
    pub(crate) config: SynchronizerConfig,
    pub(crate) registry: PillarRegistry,

    /// Engine state (broadcast to watchers)
    pub(crate) state: watch::Sender<EngineState>,
    pub(crate) state_rx: watch::Receiver<EngineState>,

    /// Background sync loop, present while running
    pub(crate) scheduler: Mutex<Option<SchedulerHandle>>,
}

impl MemorySynchronizer {
    /// Create a synchronizer over a frozen registry.
    ///
    /// The engine starts in `Created` state; call
    /// [`initialize()`](Self::initialize) to bring the pillars online.
    #[must_use]
    pub fn new(config: SynchronizerConfig, registry: PillarRegistry) -> Self {
        let (state_tx, state_rx) = watch::channel(EngineState::Created);
        Self {
            config,
            registry,
            state: state_tx,
            state_rx,
            scheduler: Mutex::new(None),
        }
    }

    /// Current engine state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        *self.state_rx.borrow()
    }

    /// Receiver to watch engine state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<EngineState> {
        self.state_rx.clone()
    }

    /// Check if the engine has completed bring-up.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() == EngineState::Ready
    }

    #[must_use]
    pub fn config(&self) -> &SynchronizerConfig {
        &self.config
    }

    /// Snapshot of every pillar's last-known health.
    ///
    /// Always non-blocking - reads the health cells without invoking any
    /// pillar.
    #[must_use]
    pub fn status(&self) -> BTreeMap<String, PillarSnapshot> {
        self.registry
            .handles()
            .iter()
            .map(|h| (h.name().to_string(), h.snapshot()))
            .collect()
    }

    /// Number of pillars currently Online.
    #[must_use]
    pub fn online_count(&self) -> usize {
        self.registry
            .handles()
            .iter()
            .filter(|h| h.state() == PillarState::Online)
            .count()
    }

    /// Handles for every Online pillar, in registry order.
    pub(crate) fn online_handles(&self) -> Vec<Arc<PillarHandle>> {
        self.registry
            .handles()
            .iter()
            .filter(|h| h.state() == PillarState::Online)
            .cloned()
            .collect()
    }
}
