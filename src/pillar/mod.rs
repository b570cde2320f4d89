//! The pillar contract.
//!
//! A pillar is one independent backend memory store (cache, vector index,
//! relational store, encrypted archive) behind a uniform async contract. The
//! engine holds pillars as `Arc<dyn Pillar>` and never depends on a concrete
//! backend's internals; implementations are supplied at composition time.

pub mod memory;

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::record::{MemoryRecord, QueryHit};

/// Backend-reported statistics, opaque to the engine.
///
/// A `BTreeMap` so that repeated `connect` calls replace entries instead of
/// duplicating them.
pub type PillarStats = BTreeMap<String, Value>;

/// Error kinds surfaced by pillar operations and by the synchronizer itself.
///
/// Per-pillar failures inside a fan-out call are captured as
/// [`OperationResult`](crate::fanout::OperationResult)s, never raised to the
/// caller. Only programmer-error conditions (an unknown pillar requested by
/// name, a record with no tags and no default pillar, an empty query string)
/// surface immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("Failed to connect: {0}")]
    ConnectFailed(String),
    #[error("Operation timed out")]
    Timeout,
    #[error("No pillar registered under '{0}'")]
    PillarNotFound(String),
    #[error("Pillar '{0}' is not online")]
    PillarUnavailable(String),
    #[error("No pillar matches the record's tags and no default is configured")]
    NoMatchingPillar,
    #[error("Query text must not be empty")]
    EmptyQuery,
    #[error("A pillar named '{0}' is already registered")]
    DuplicatePillar(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Contract every concrete pillar implements.
///
/// All methods take `&self`; pillars use interior mutability. Mutating
/// operations (`connect`, `sync`, `store`, `flush`) are serialized per
/// pillar by the engine's operation lock, so an implementation never sees
/// two of them in flight at once. `query` may overlap with a sync in
/// progress and must therefore be read-only.
#[async_trait]
pub trait Pillar: Send + Sync {
    /// Stable, unique name (e.g. `"redis"`, `"vault"`). Immutable after
    /// registration.
    fn name(&self) -> &str;

    /// Capability tags used for write routing (e.g. `cache`, `vector`,
    /// `secure`).
    fn capabilities(&self) -> &BTreeSet<String>;

    /// Establish backend connectivity and report current stats.
    ///
    /// Idempotent: calling on an already-connected pillar re-validates and
    /// returns current stats rather than erroring.
    async fn connect(&self) -> Result<PillarStats, ErrorKind>;

    /// Reconcile local/remote state. Safe to invoke repeatedly; never
    /// invoked concurrently with itself for the same pillar.
    async fn sync(&self) -> Result<(), ErrorKind>;

    /// Read-only search. Returns an empty vec (not an error) when nothing
    /// matches. Must not mutate backend state.
    async fn query(&self, text: &str) -> Result<Vec<QueryHit>, ErrorKind>;

    /// Write a record.
    async fn store(&self, record: &MemoryRecord) -> Result<(), ErrorKind>;

    /// Clear transient/cached data. Destructive - only ever invoked on
    /// explicit request, never by the background sync cycle.
    async fn flush(&self) -> Result<(), ErrorKind>;
}
