//! Fan-out execution across pillars.
//!
//! One tokio task per targeted pillar, all joined before the call returns.
//! Failure isolation is the core guarantee: no early cancellation on first
//! failure, and a pillar that times out or panics is recorded as a failed
//! outcome without delaying its siblings. Results come back in target order,
//! which downstream merge logic relies on for deterministic tie-breaks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::pillar::ErrorKind;
use crate::registry::PillarHandle;

/// Per-pillar outcome of one fan-out call.
///
/// `outcome` carries the payload on success or the error kind on failure -
/// never both.
#[derive(Debug)]
pub struct OperationResult<T> {
    pub pillar: String,
    pub outcome: Result<T, ErrorKind>,
    pub duration: Duration,
}

impl<T> OperationResult<T> {
    #[must_use]
    pub fn success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// All per-pillar outcomes of one fan-out call.
///
/// Constructed fresh per call and never mutated after return. Overall
/// success is quorum-of-one: a single degraded pillar never blocks the whole
/// memory surface. Callers needing stricter guarantees inspect the
/// individual results.
#[derive(Debug)]
pub struct AggregateResult<T> {
    pub results: Vec<OperationResult<T>>,
}

impl<T> AggregateResult<T> {
    /// True iff at least one targeted pillar succeeded.
    #[must_use]
    pub fn overall_success(&self) -> bool {
        self.results.iter().any(OperationResult::success)
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Outcome for a specific pillar, if it was targeted.
    #[must_use]
    pub fn get(&self, pillar: &str) -> Option<&OperationResult<T>> {
        self.results.iter().find(|r| r.pillar == pillar)
    }
}

/// Run `op` against each target as an independent concurrent task and join
/// all outcomes.
///
/// The number of results always equals the number of targets, regardless of
/// how many failed. A panicking task is captured as a `Backend` outcome.
pub async fn fan_out<T, F, Fut>(
    operation: &'static str,
    targets: Vec<Arc<PillarHandle>>,
    op: F,
) -> AggregateResult<T>
where
    T: Send + 'static,
    F: Fn(Arc<PillarHandle>) -> Fut,
    Fut: Future<Output = Result<T, ErrorKind>> + Send + 'static,
{
    let mut tasks = Vec::with_capacity(targets.len());
    for handle in targets {
        let pillar = handle.name().to_string();
        let fut = op(handle);
        let task = tokio::spawn(async move {
            let start = Instant::now();
            let outcome = fut.await;
            (outcome, start.elapsed())
        });
        tasks.push((pillar, task));
    }

    let mut results = Vec::with_capacity(tasks.len());
    for (pillar, task) in tasks {
        let (outcome, duration) = match task.await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(pillar = %pillar, operation, error = %e, "Fan-out task panicked");
                (
                    Err(ErrorKind::Backend(format!("task failed: {e}"))),
                    Duration::ZERO,
                )
            }
        };

        let status = match &outcome {
            Ok(_) => "success",
            Err(ErrorKind::Timeout) => "timeout",
            Err(_) => "error",
        };
        crate::metrics::record_operation(&pillar, operation, status);
        crate::metrics::record_latency(&pillar, operation, duration);

        results.push(OperationResult {
            pillar,
            outcome,
            duration,
        });
    }

    AggregateResult { results }
}
