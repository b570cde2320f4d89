//! Property-based tests for query-result merging.
//!
//! Verifies the merge invariants over arbitrary pillar hit sets: no hit is
//! dropped, relevance ordering is descending, and equal relevances keep
//! registry order.
//!
//! Run with: `cargo test --test query_merge_prop`

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::json;

use memory_sync::{
    ErrorKind, MemoryRecord, MemorySynchronizer, Pillar, PillarRegistry, PillarStats,
    QueryHit, SynchronizerConfig,
};

struct FixedHitsPillar {
    name: String,
    capabilities: BTreeSet<String>,
    relevances: Vec<f64>,
}

#[async_trait]
impl Pillar for FixedHitsPillar {
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
            .map(|&r| QueryHit::new(r, json!(null)))
            .collect())
    }

    async fn store(&self, _record: &MemoryRecord) -> Result<(), ErrorKind> {
        Ok(())
    }

    async fn flush(&self) -> Result<(), ErrorKind> {
        Ok(())
    }
}

/// Per-pillar relevance lists: 1-4 pillars, 0-8 hits each, coarse scores so
/// ties actually occur.
fn hit_sets_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    prop::collection::vec(
        prop::collection::vec((0u8..=10).prop_map(|r| f64::from(r) / 10.0), 0..8),
        1..=4,
    )
}

fn run_query(hit_sets: &[Vec<f64>]) -> Vec<QueryHit> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap();
    runtime.block_on(async {
        let mut registry = PillarRegistry::new();
        for (i, relevances) in hit_sets.iter().enumerate() {
            registry
                .register(Arc::new(FixedHitsPillar {
                    name: format!("pillar-{i}"),
                    capabilities: ["cache".to_string()].into(),
                    relevances: relevances.clone(),
                }))
                .unwrap();
        }
        let engine = MemorySynchronizer::new(SynchronizerConfig::default(), registry);
        engine.initialize().await;
        engine.query("anything", None).await.unwrap()
    })
}

proptest! {
    /// Every hit survives the merge - no silent drops.
    #[test]
    fn prop_merge_preserves_every_hit(hit_sets in hit_sets_strategy()) {
        let merged = run_query(&hit_sets);
        let expected: usize = hit_sets.iter().map(Vec::len).sum();
        prop_assert_eq!(merged.len(), expected);
    }

    /// Merged hits are sorted by descending relevance.
    #[test]
    fn prop_merge_sorted_descending(hit_sets in hit_sets_strategy()) {
        let merged = run_query(&hit_sets);
        for pair in merged.windows(2) {
            prop_assert!(pair[0].relevance >= pair[1].relevance);
        }
    }

    /// Equal relevances keep registry order (stable sort over the
    /// registry-ordered concatenation).
    #[test]
    fn prop_merge_ties_keep_registry_order(hit_sets in hit_sets_strategy()) {
        let merged = run_query(&hit_sets);
        let index_of = |hit: &QueryHit| -> usize {
            hit.pillar
                .strip_prefix("pillar-")
                .and_then(|s| s.parse().ok())
                .unwrap()
        };
        for pair in merged.windows(2) {
            if pair[0].relevance == pair[1].relevance {
                prop_assert!(index_of(&pair[0]) <= index_of(&pair[1]));
            }
        }
    }
}
