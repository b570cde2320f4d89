//! # Memory Sync
//!
//! A multi-backend memory synchronization engine: several independent,
//! heterogeneous storage backends ("pillars") presented as one coherent
//! memory surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Memory Synchronizer                      │
//! │  • initialize / sync_all / query / store / flush / status  │
//! │  • Capability routing, query merge, quorum-of-one writes   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (Fan-out: one task per pillar,
//!                     joined before the call returns)
//!                              ▼
//! ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐
//! │  redis   │  │  chroma  │  │  sqlite  │  │  vault   │  ...
//! │  cache   │  │  vector  │  │relational│  │  secure  │
//! └──────────┘  └──────────┘  └──────────┘  └──────────┘
//!   each pillar: own operation lock + health state machine
//!   Uninitialized → Connecting → Online ⇄ Degraded, Offline → retry
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use memory_sync::{
//!     InMemoryPillar, MemoryRecord, MemorySynchronizer, PillarRegistry,
//!     SynchronizerConfig,
//! };
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut registry = PillarRegistry::new();
//!     registry.register(Arc::new(InMemoryPillar::new("redis", ["cache"]))).unwrap();
//!     registry.register(Arc::new(InMemoryPillar::new("chroma", ["vector"]))).unwrap();
//!
//!     let engine = Arc::new(MemorySynchronizer::new(
//!         SynchronizerConfig::default(),
//!         registry,
//!     ));
//!
//!     // Bring pillars online (failures degrade, never abort)
//!     engine.initialize().await;
//!     engine.start_scheduler();
//!
//!     // Route a write by capability tags
//!     let record = MemoryRecord::new(json!({"note": "embeddings refreshed"}))
//!         .with_tag("vector");
//!     let stored = engine.store(record).await.unwrap();
//!     assert!(stored.overall_success());
//!
//!     // Fan-out query, merged by descending relevance
//!     let hits = engine.query("embeddings", None).await.unwrap();
//!     assert_eq!(hits[0].pillar, "chroma");
//!
//!     engine.shutdown().await;
//! }
//! ```
//!
//! ## Guarantees
//!
//! - **Failure isolation**: one pillar's failure never aborts its siblings;
//!   every fan-out returns one outcome per targeted pillar.
//! - **At most one mutating operation per pillar**: connect/sync/store/flush
//!   serialize on a per-pillar lock; the background scheduler cannot race an
//!   on-demand sync or flush on the same backend.
//! - **Quorum-of-one writes**: a store is durable when at least one targeted
//!   pillar accepted it; stricter callers inspect individual outcomes.
//! - **Bounded fan-out**: every per-pillar invocation carries a timeout; no
//!   background work escapes a call's caller except the cancellable
//!   scheduler.
//!
//! ## Modules
//!
//! - [`synchronizer`]: the [`MemorySynchronizer`] orchestrating all pillars
//! - [`pillar`]: the [`Pillar`] contract and the in-memory reference backend
//! - [`registry`]: insertion-ordered pillar registry and operation handles
//! - [`fanout`]: concurrent fan-out executor and per-pillar results
//! - [`health`]: per-pillar state machine and snapshots
//! - [`scheduler`]: cancellable background sync loop
//! - [`config`]: timeouts, sync interval, default routing

pub mod config;
pub mod record;
pub mod pillar;
pub mod health;
pub mod registry;
pub mod fanout;
pub mod scheduler;
pub mod synchronizer;
pub mod metrics;

pub use config::SynchronizerConfig;
pub use fanout::{AggregateResult, OperationResult};
pub use health::{PillarSnapshot, PillarState};
pub use pillar::memory::InMemoryPillar;
pub use pillar::{ErrorKind, Pillar, PillarStats};
pub use record::{MemoryRecord, QueryHit};
pub use registry::{PillarHandle, PillarRegistry};
pub use scheduler::SchedulerHandle;
pub use synchronizer::{EngineState, MemorySynchronizer, SyncOutcome};
