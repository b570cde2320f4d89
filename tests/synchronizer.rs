//! Integration tests for the memory synchronizer.
//!
//! All tests run against in-process pillars (no external backends), so
//! nothing here is `--ignored`.
//!
//! # Test Organization
//! - `happy_*` - normal operation: lifecycle, routing, query merge, scheduler

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use memory_sync::{
    ErrorKind, InMemoryPillar, MemoryRecord, MemorySynchronizer, Pillar, PillarRegistry,
    PillarState, PillarStats, QueryHit, SynchronizerConfig,
};

// =============================================================================
// Scripted pillar - returns a fixed set of query hits
// =============================================================================

struct ScriptedPillar {
    name: String,
    capabilities: BTreeSet<String>,
    relevances: Vec<f64>,
}

impl ScriptedPillar {
    fn new(name: &str, relevances: &[f64]) -> Self {
        Self {
            name: name.to_string(),
            capabilities: ["cache".to_string()].into(),
            relevances: relevances.to_vec(),
        }
    }
}

#[async_trait]
impl Pillar for ScriptedPillar {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    async fn connect(&self) -> Result<PillarStats, ErrorKind> {
        Ok(PillarStats::new())
    }

    async fn sync(&self) -> Result<(), ErrorKind> {
        Ok(())
    }

    async fn query(&self, _text: &str) -> Result<Vec<QueryHit>, ErrorKind> {
        Ok(self
            .relevances
            .iter()
            .map(|&r| QueryHit::new(r, json!({"from": self.name})))
            .collect())
    }

    async fn store(&self, _record: &MemoryRecord) -> Result<(), ErrorKind> {
        Ok(())
    }

    async fn flush(&self) -> Result<(), ErrorKind> {
        Ok(())
    }
}

fn scripted_engine(pillars: &[(&str, &[f64])]) -> MemorySynchronizer {
    let mut registry = PillarRegistry::new();
    for (name, relevances) in pillars {
        registry
            .register(Arc::new(ScriptedPillar::new(name, relevances)))
            .unwrap();
    }
    MemorySynchronizer::new(SynchronizerConfig::default(), registry)
}

fn memory_engine() -> MemorySynchronizer {
    let mut registry = PillarRegistry::new();
    registry
        .register(Arc::new(InMemoryPillar::new("redis", ["cache"])))
        .unwrap();
    registry
        .register(Arc::new(InMemoryPillar::new("chroma", ["vector"])))
        .unwrap();
    registry
        .register(Arc::new(InMemoryPillar::new("vault", ["secure"])))
        .unwrap();
    MemorySynchronizer::new(SynchronizerConfig::default(), registry)
}

// =============================================================================
// Happy Path Tests
// =============================================================================

#[tokio::test]
async fn happy_full_lifecycle() {
    let engine = Arc::new(memory_engine());

    let bring_up = engine.initialize().await;
    assert!(bring_up.overall_success());
    assert_eq!(bring_up.len(), 3);
    assert!(engine.is_ready());

    engine.start_scheduler();

    let stored = engine
        .store(MemoryRecord::new(json!({"note": "vault rotation due"})).with_tag("secure"))
        .await
        .unwrap();
    assert!(stored.overall_success());

    let hits = engine.query("rotation", None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].pillar, "vault");

    let status = engine.status();
    assert_eq!(status.len(), 3);
    assert!(status.values().all(|s| s.state == PillarState::Online));

    engine.shutdown().await;
}

#[tokio::test]
async fn happy_query_merge_ordering() {
    // Pillars returning hits with relevances [0.6], [0.9, 0.3], []
    let engine = scripted_engine(&[("a", &[0.6]), ("b", &[0.9, 0.3]), ("c", &[])]);
    engine.initialize().await;

    let hits = engine.query("anything", None).await.unwrap();
    let relevances: Vec<f64> = hits.iter().map(|h| h.relevance).collect();
    assert_eq!(relevances, [0.9, 0.6, 0.3]);
    assert_eq!(hits[0].pillar, "b");
    assert_eq!(hits[1].pillar, "a");
}

#[tokio::test]
async fn happy_query_ties_break_by_registry_order() {
    let engine = scripted_engine(&[("second", &[0.5]), ("first", &[0.8, 0.5]), ("third", &[0.5])]);
    engine.initialize().await;

    let hits = engine.query("anything", None).await.unwrap();
    assert_eq!(hits[0].relevance, 0.8);
    // All 0.5s keep registration order
    let tied: Vec<&str> = hits[1..].iter().map(|h| h.pillar.as_str()).collect();
    assert_eq!(tied, ["second", "first", "third"]);
}

#[tokio::test]
async fn happy_named_query_routes_to_one_pillar() {
    let engine = scripted_engine(&[("a", &[0.6]), ("b", &[0.9])]);
    engine.initialize().await;

    let hits = engine.query("anything", Some("a")).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].pillar, "a");
    assert_eq!(hits[0].relevance, 0.6);
}

#[tokio::test]
async fn happy_connect_twice_stays_online_without_duplicate_stats() {
    let engine = memory_engine();
    engine.initialize().await;
    let first = engine.status()["redis"].stats.clone();

    // Second bring-up re-validates already online pillars
    let again = engine.initialize().await;
    assert!(again.overall_success());
    assert_eq!(engine.status()["redis"].state, PillarState::Online);
    assert_eq!(engine.status()["redis"].stats.len(), first.len());
}

#[tokio::test]
async fn happy_store_then_query_roundtrip_across_pillars() {
    let engine = memory_engine();
    engine.initialize().await;

    engine
        .store(MemoryRecord::new(json!({"doc": "embeddings for project alpha"})).with_tag("vector"))
        .await
        .unwrap();
    engine
        .store(MemoryRecord::new(json!({"doc": "alpha cache line"})).with_tag("cache"))
        .await
        .unwrap();

    let hits = engine.query("alpha", None).await.unwrap();
    assert_eq!(hits.len(), 2);
    let sources: BTreeSet<&str> = hits.iter().map(|h| h.pillar.as_str()).collect();
    assert_eq!(sources, ["chroma", "redis"].into());
}

#[tokio::test]
async fn happy_flush_never_runs_during_plain_sync_cycles() {
    // sync_all must not clear data: flush is explicit-only
    let engine = memory_engine();
    engine.initialize().await;
    engine
        .store(MemoryRecord::new(json!({"keep": "me"})).with_tag("cache"))
        .await
        .unwrap();

    engine.sync_all().await;
    engine.sync_all().await;

    assert_eq!(engine.query("keep", None).await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn happy_scheduler_trigger_and_shutdown() {
    let engine = Arc::new(memory_engine());
    engine.initialize().await;
    engine.start_scheduler();
    tokio::time::sleep(Duration::from_millis(1)).await;

    engine.trigger_sync();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(engine.status()["redis"].last_synced_at.is_some());

    // Second start is a no-op, shutdown joins cleanly
    engine.start_scheduler();
    engine.shutdown().await;
    assert_eq!(format!("{}", engine.state()), "ShuttingDown");
}

#[tokio::test]
async fn happy_fanout_result_count_matches_targets() {
    let engine = memory_engine();
    let bring_up = engine.initialize().await;
    assert_eq!(bring_up.len(), 3);

    let cycle = engine.sync_all().await;
    assert_eq!(cycle.len(), 3);

    let flushed = engine.flush(None).await.unwrap();
    assert_eq!(flushed.len(), 3);
}
