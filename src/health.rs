//! Per-pillar health tracking.
//!
//! Every fan-out outcome updates the state of exactly the pillar it
//! targeted. The state machine:
//!
//! ```text
//! Uninitialized → Connecting → Online
//!                 Connecting → Offline   (connect failure)
//! Online  → Degraded                     (failed sync/query/store)
//! Degraded → Online                      (next successful operation)
//! Offline → Connecting                   (scheduled or explicit retry)
//! ```
//!
//! There is no terminal state - Offline pillars are retried on every
//! scheduled sync cycle.

use parking_lot::RwLock;
use serde::Serialize;

use crate::pillar::PillarStats;

/// Health state of one pillar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PillarState {
    /// Registered but never connected
    Uninitialized,
    /// Connect attempt in flight
    Connecting,
    /// Reachable, last operation succeeded
    Online,
    /// Reachable, last operation failed
    Degraded,
    /// Connect failed; retried on the next sync cycle
    Offline,
}

impl std::fmt::Display for PillarState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "Uninitialized"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Online => write!(f, "Online"),
            Self::Degraded => write!(f, "Degraded"),
            Self::Offline => write!(f, "Offline"),
        }
    }
}

/// Point-in-time view of one pillar's health.
#[derive(Debug, Clone, Serialize)]
pub struct PillarSnapshot {
    pub state: PillarState,
    /// Backend-reported stats from the last successful connect
    pub stats: PillarStats,
    /// Epoch millis of the last successful sync, if any
    pub last_synced_at: Option<i64>,
}

#[derive(Debug)]
struct HealthInner {
    state: PillarState,
    stats: PillarStats,
    last_synced_at: Option<i64>,
}

/// Shared health cell for one pillar.
///
/// Written by the task running an operation against the pillar, read without
/// blocking by `status()`.
#[derive(Debug)]
pub struct HealthCell {
    inner: RwLock<HealthInner>,
}

impl HealthCell {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HealthInner {
                state: PillarState::Uninitialized,
                stats: PillarStats::new(),
                last_synced_at: None,
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> PillarState {
        self.inner.read().state
    }

    #[must_use]
    pub fn snapshot(&self) -> PillarSnapshot {
        let inner = self.inner.read();
        PillarSnapshot {
            state: inner.state,
            stats: inner.stats.clone(),
            last_synced_at: inner.last_synced_at,
        }
    }

    /// A connect attempt is starting.
    pub fn begin_connect(&self) {
        self.inner.write().state = PillarState::Connecting;
    }

    /// Connect succeeded; stats are replaced wholesale.
    pub fn mark_online(&self, stats: PillarStats) {
        let mut inner = self.inner.write();
        inner.state = PillarState::Online;
        inner.stats = stats;
    }

    /// Connect failed.
    pub fn mark_offline(&self) {
        self.inner.write().state = PillarState::Offline;
    }

    /// A sync/query/store/flush succeeded. Recovers `Degraded → Online`;
    /// `Offline` pillars only come back through a successful connect.
    pub fn record_success(&self, synced: bool) {
        let mut inner = self.inner.write();
        if inner.state == PillarState::Degraded {
            inner.state = PillarState::Online;
        }
        if synced {
            inner.last_synced_at = Some(epoch_millis());
        }
    }

    /// A sync/query/store/flush failed.
    pub fn record_failure(&self) {
        let mut inner = self.inner.write();
        if inner.state == PillarState::Online {
            inner.state = PillarState::Degraded;
        }
    }
}

impl Default for HealthCell {
    fn default() -> Self {
        Self::new()
    }
}

fn epoch_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
