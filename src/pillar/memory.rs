//! In-memory reference pillar.
//!
//! Backed by a `DashMap`, used in tests and as a template for writing real
//! backend adapters. Query is a lowercase term-overlap match over the JSON
//! text of stored records, scored 0.0-1.0 by the fraction of query terms
//! found.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::json;

use crate::record::{MemoryRecord, QueryHit};

use super::{ErrorKind, Pillar, PillarStats};

pub struct InMemoryPillar {
    name: String,
    capabilities: BTreeSet<String>,
    records: DashMap<u64, MemoryRecord>,
    next_id: AtomicU64,
    syncs: AtomicU64,
    flushes: AtomicU64,
}

impl InMemoryPillar {
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
            records: DashMap::new(),
            next_id: AtomicU64::new(0),
            syncs: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
        }
    }

    /// Number of completed sync calls (useful for scheduler tests)
    #[must_use]
    pub fn sync_count(&self) -> u64 {
        self.syncs.load(Ordering::Relaxed)
    }

    /// Current record count
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl Pillar for InMemoryPillar {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    async fn connect(&self) -> Result<PillarStats, ErrorKind> {
        // Nothing to establish; report current stats
        let mut stats = PillarStats::new();
        stats.insert("records".into(), json!(self.records.len()));
        stats.insert("syncs".into(), json!(self.syncs.load(Ordering::Relaxed)));
        stats.insert("flushes".into(), json!(self.flushes.load(Ordering::Relaxed)));
        Ok(stats)
    }

    async fn sync(&self) -> Result<(), ErrorKind> {
        // No remote side to reconcile with
        self.syncs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn query(&self, text: &str) -> Result<Vec<QueryHit>, ErrorKind> {
        let needle = text.to_lowercase();
        let terms: Vec<&str> = needle.split_whitespace().collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = Vec::new();
        for entry in self.records.iter() {
            let haystack = entry.value().content.to_string().to_lowercase();
            let matched = terms.iter().filter(|t| haystack.contains(**t)).count();
            if matched > 0 {
                let relevance = matched as f64 / terms.len() as f64;
                hits.push(QueryHit::new(relevance, entry.value().content.clone()));
            }
        }
        Ok(hits)
    }

    async fn store(&self, record: &MemoryRecord) -> Result<(), ErrorKind> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.records.insert(id, record.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<(), ErrorKind> {
        self.records.clear();
        self.flushes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
