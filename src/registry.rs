//! Pillar registry and per-pillar operation handles.
//!
//! The registry is an insertion-ordered, named collection of pillars. It is
//! frozen once handed to the synchronizer; iteration order is the tie-break
//! priority for query-result ranking and routing.
//!
//! Each [`PillarHandle`] pairs a pillar with its operation lock and health
//! cell. The lock is held for the duration of any mutating invocation
//! (`connect`/`sync`/`store`/`flush`), guaranteeing at most one mutating
//! operation per pillar at a time. `query` takes no lock: reads are
//! eventually consistent and may reflect pre- or post-sync state.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::health::{HealthCell, PillarSnapshot, PillarState};
use crate::pillar::{ErrorKind, Pillar, PillarStats};
use crate::record::{MemoryRecord, QueryHit};

/// One registered pillar plus its engine-side state.
pub struct PillarHandle {
    pillar: Arc<dyn Pillar>,
    op_lock: Mutex<()>,
    health: HealthCell,
}

impl PillarHandle {
    #[must_use]
    pub fn new(pillar: Arc<dyn Pillar>) -> Self {
        Self {
            pillar,
            op_lock: Mutex::new(()),
            health: HealthCell::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.pillar.name()
    }

    #[must_use]
    pub fn capabilities(&self) -> &BTreeSet<String> {
        self.pillar.capabilities()
    }

    /// Last-known state, without touching the backend.
    #[must_use]
    pub fn state(&self) -> PillarState {
        self.health.state()
    }

    /// Last-known `{state, stats, last_synced_at}`, without touching the
    /// backend. Never blocks.
    #[must_use]
    pub fn snapshot(&self) -> PillarSnapshot {
        self.health.snapshot()
    }

    /// Connect (or re-validate) the backend, bounded by `limit`.
    ///
    /// Success moves the pillar `Online` and replaces its stats; failure or
    /// timeout moves it `Offline`.
    pub async fn connect(&self, limit: Duration) -> Result<PillarStats, ErrorKind> {
        self.health.begin_connect();
        let result = match timeout(limit, async {
            let _guard = self.op_lock.lock().await;
            self.pillar.connect().await
        })
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ErrorKind::Timeout),
        };

        match &result {
            Ok(stats) => self.health.mark_online(stats.clone()),
            Err(_) => self.health.mark_offline(),
        }
        result
    }

    /// Sync the backend if it is not already mid-operation.
    ///
    /// Returns `None` when the operation lock is held (the pillar is
    /// skipped this cycle rather than queued behind the in-flight
    /// operation).
    pub async fn try_sync(&self, limit: Duration) -> Option<Result<(), ErrorKind>> {
        let Ok(_guard) = self.op_lock.try_lock() else {
            return None;
        };

        let result = match timeout(limit, self.pillar.sync()).await {
            Ok(result) => result,
            Err(_) => Err(ErrorKind::Timeout),
        };

        match &result {
            Ok(()) => self.health.record_success(true),
            Err(_) => self.health.record_failure(),
        }
        Some(result)
    }

    /// Read-only query, bounded by `limit`. Takes no lock; hits are stamped
    /// with this pillar's name.
    pub async fn query(&self, text: &str, limit: Duration) -> Result<Vec<QueryHit>, ErrorKind> {
        let result = match timeout(limit, self.pillar.query(text)).await {
            Ok(result) => result,
            Err(_) => Err(ErrorKind::Timeout),
        };

        match result {
            Ok(mut hits) => {
                self.health.record_success(false);
                for hit in &mut hits {
                    hit.pillar = self.name().to_string();
                }
                Ok(hits)
            }
            Err(e) => {
                self.health.record_failure();
                Err(e)
            }
        }
    }

    /// Write a record, serialized against other mutating operations and
    /// bounded by `limit`.
    pub async fn store(&self, record: &MemoryRecord, limit: Duration) -> Result<(), ErrorKind> {
        let result = match timeout(limit, async {
            let _guard = self.op_lock.lock().await;
            self.pillar.store(record).await
        })
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ErrorKind::Timeout),
        };

        match &result {
            Ok(()) => self.health.record_success(false),
            Err(_) => self.health.record_failure(),
        }
        result
    }

    /// Flush the backend, serialized against other mutating operations and
    /// bounded by `limit`.
    pub async fn flush(&self, limit: Duration) -> Result<(), ErrorKind> {
        let result = match timeout(limit, async {
            let _guard = self.op_lock.lock().await;
            self.pillar.flush().await
        })
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ErrorKind::Timeout),
        };

        match &result {
            Ok(()) => self.health.record_success(false),
            Err(_) => self.health.record_failure(),
        }
        result
    }
}

/// Insertion-ordered mapping from name to pillar handle.
#[derive(Default)]
pub struct PillarRegistry {
    handles: Vec<Arc<PillarHandle>>,
    index: HashMap<String, usize>,
}

impl PillarRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pillar. Names must be unique; registration order is the
    /// ranking tie-break order.
    pub fn register(&mut self, pillar: Arc<dyn Pillar>) -> Result<(), ErrorKind> {
        let name = pillar.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ErrorKind::DuplicatePillar(name));
        }
        self.index.insert(name, self.handles.len());
        self.handles.push(Arc::new(PillarHandle::new(pillar)));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<PillarHandle>> {
        self.index.get(name).map(|&i| self.handles[i].clone())
    }

    /// Handles in registration order.
    #[must_use]
    pub fn handles(&self) -> &[Arc<PillarHandle>] {
        &self.handles
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
