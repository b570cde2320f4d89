//! Public types for the synchronizer.

/// Engine lifecycle state.
///
/// Use [`super::MemorySynchronizer::state()`] to check the current state or
/// [`super::MemorySynchronizer::state_receiver()`] to watch for changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Just created, pillars registered but not connected
    Created,
    /// Fan-out connect in flight
    Initializing,
    /// Usable (possibly with some pillars Offline)
    Ready,
    /// Scheduler cancelled, engine winding down
    ShuttingDown,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Initializing => write!(f, "Initializing"),
            Self::Ready => write!(f, "Ready"),
            Self::ShuttingDown => write!(f, "ShuttingDown"),
        }
    }
}

/// Per-pillar outcome of one sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Backend reconciled
    Synced,
    /// Pillar was Offline; the cycle re-attempted connect and it came back
    Reconnected,
    /// Pillar was mid-operation; not targeted this cycle
    Skipped,
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synced => write!(f, "Synced"),
            Self::Reconnected => write!(f, "Reconnected"),
            Self::Skipped => write!(f, "Skipped"),
        }
    }
}
