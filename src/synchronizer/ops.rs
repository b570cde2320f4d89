//! Public operations: sync_all, query, store, flush.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::fanout::{fan_out, AggregateResult};
use crate::health::PillarState;
use crate::pillar::ErrorKind;
use crate::record::{MemoryRecord, QueryHit};
use crate::registry::PillarHandle;

use super::{MemorySynchronizer, SyncOutcome};

impl MemorySynchronizer {
    /// Run one sync cycle across all pillars.
    ///
    /// Pillars already mid-operation are skipped rather than queued (at most
    /// one mutating operation per pillar at a time). Offline and
    /// never-connected pillars get a reconnect attempt instead of a sync -
    /// this is the automatic retry path for failed bring-up.
    ///
    /// Invoked both on demand and by the background scheduler.
    #[tracing::instrument(skip(self))]
    pub async fn sync_all(&self) -> AggregateResult<SyncOutcome> {
        let connect_limit = self.config.connect_timeout();
        let sync_limit = self.config.sync_timeout();
        let targets = self.registry.handles().to_vec();
        crate::metrics::record_fanout_targets("sync", targets.len());

        let aggregate = fan_out("sync", targets, move |h| async move {
            match h.state() {
                PillarState::Offline | PillarState::Uninitialized => h
                    .connect(connect_limit)
                    .await
                    .map(|_| SyncOutcome::Reconnected),
                _ => match h.try_sync(sync_limit).await {
                    None => Ok(SyncOutcome::Skipped),
                    Some(Ok(())) => Ok(SyncOutcome::Synced),
                    Some(Err(e)) => Err(e),
                },
            }
        })
        .await;

        let synced = aggregate
            .results
            .iter()
            .filter(|r| matches!(r.outcome, Ok(SyncOutcome::Synced)))
            .count();
        let reconnected = aggregate
            .results
            .iter()
            .filter(|r| matches!(r.outcome, Ok(SyncOutcome::Reconnected)))
            .count();
        for result in &aggregate.results {
            if let Err(e) = &result.outcome {
                warn!(pillar = %result.pillar, error = %e, "Sync failed");
            }
        }
        crate::metrics::record_sync_cycle(synced, reconnected, aggregate.failed());
        crate::metrics::set_pillars_online(self.online_count());

        info!(
            synced,
            reconnected,
            failed = aggregate.failed(),
            "Sync cycle complete"
        );
        aggregate
    }

    /// Query the memory surface.
    ///
    /// With `pillar` given, routes to that single pillar (`PillarNotFound`
    /// if absent, `PillarUnavailable` if not Online). Otherwise fans out to
    /// every Online pillar and returns all hits merged, sorted descending by
    /// relevance with ties broken by registry order. No truncation - callers
    /// apply their own top-K.
    ///
    /// Queries take no pillar lock, so results may reflect either pre- or
    /// post-sync state while a cycle is in flight.
    #[tracing::instrument(skip(self), fields(pillar = pillar.unwrap_or("*")))]
    pub async fn query(
        &self,
        text: &str,
        pillar: Option<&str>,
    ) -> Result<Vec<QueryHit>, ErrorKind> {
        if text.trim().is_empty() {
            return Err(ErrorKind::EmptyQuery);
        }
        let limit = self.config.query_timeout();

        if let Some(name) = pillar {
            let handle = self
                .registry
                .get(name)
                .ok_or_else(|| ErrorKind::PillarNotFound(name.to_string()))?;
            if handle.state() != PillarState::Online {
                return Err(ErrorKind::PillarUnavailable(name.to_string()));
            }
            let start = std::time::Instant::now();
            let result = handle.query(text, limit).await;
            let status = match &result {
                Ok(_) => "success",
                Err(ErrorKind::Timeout) => "timeout",
                Err(_) => "error",
            };
            crate::metrics::record_operation(name, "query", status);
            crate::metrics::record_latency(name, "query", start.elapsed());
            return result;
        }

        let targets = self.online_handles();
        crate::metrics::record_fanout_targets("query", targets.len());
        if targets.is_empty() {
            debug!("No pillar online, query returns empty");
            return Ok(Vec::new());
        }

        let text = text.to_string();
        let aggregate = fan_out("query", targets, move |h| {
            let text = text.clone();
            async move { h.query(&text, limit).await }
        })
        .await;

        // Concatenation follows registry order, so the stable sort below
        // breaks relevance ties by registry priority.
        let mut hits = Vec::new();
        for result in aggregate.results {
            match result.outcome {
                Ok(pillar_hits) => hits.extend(pillar_hits),
                Err(e) => {
                    warn!(pillar = %result.pillar, error = %e, "Query failed on pillar, dropping its hits");
                }
            }
        }
        hits.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));

        crate::metrics::record_query_hits(hits.len());
        Ok(hits)
    }

    /// Store a record on every Online pillar whose capabilities intersect
    /// the record's tags.
    ///
    /// With no matching pillar the record falls back to the configured
    /// default pillar; with no default either, this is the immediate
    /// `NoMatchingPillar` error. The record counts as durably stored when
    /// `overall_success()` holds (quorum-of-one).
    #[tracing::instrument(skip(self, record), fields(tags = ?record.tags))]
    pub async fn store(
        &self,
        record: MemoryRecord,
    ) -> Result<AggregateResult<()>, ErrorKind> {
        let mut targets: Vec<Arc<PillarHandle>> = self
            .online_handles()
            .into_iter()
            .filter(|h| h.capabilities().iter().any(|c| record.tags.contains(c)))
            .collect();

        if targets.is_empty() {
            let Some(name) = self.config.default_pillar.as_deref() else {
                return Err(ErrorKind::NoMatchingPillar);
            };
            let handle = self
                .registry
                .get(name)
                .ok_or_else(|| ErrorKind::PillarNotFound(name.to_string()))?;
            debug!(default = name, "No capability match, routing to default pillar");
            targets.push(handle);
        }

        let limit = self.config.store_timeout();
        crate::metrics::record_fanout_targets("store", targets.len());
        let record = Arc::new(record);
        let aggregate = fan_out("store", targets, move |h| {
            let record = Arc::clone(&record);
            async move { h.store(&record, limit).await }
        })
        .await;

        if !aggregate.overall_success() {
            warn!(targets = aggregate.len(), "Store failed on every targeted pillar");
        }
        Ok(aggregate)
    }

    /// Flush transient data from one named pillar, or from all pillars.
    ///
    /// Destructive and explicit-only - the background sync cycle never
    /// flushes. Serializes against each pillar's own lock, so a flush can
    /// run alongside an in-flight sync cycle touching other pillars.
    #[tracing::instrument(skip(self), fields(pillar = pillar.unwrap_or("*")))]
    pub async fn flush(&self, pillar: Option<&str>) -> Result<AggregateResult<()>, ErrorKind> {
        let targets = match pillar {
            Some(name) => {
                let handle = self
                    .registry
                    .get(name)
                    .ok_or_else(|| ErrorKind::PillarNotFound(name.to_string()))?;
                vec![handle]
            }
            None => self.registry.handles().to_vec(),
        };

        let limit = self.config.flush_timeout();
        crate::metrics::record_fanout_targets("flush", targets.len());
        let aggregate = fan_out("flush", targets, move |h| async move {
            h.flush(limit).await
        })
        .await;

        info!(
            flushed = aggregate.succeeded(),
            failed = aggregate.failed(),
            "Flush complete"
        );
        Ok(aggregate)
    }
}
