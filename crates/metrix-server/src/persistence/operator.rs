use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use metrix_core::error::Result;
use metrix_core::{Counter, Gauge, MetricStore, Snapshot};

use super::backend::SnapshotBackend;

/// When snapshots are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotPolicy {
    /// After every mutating request.
    Synchronous,
    /// On a fixed interval from a background task.
    Periodic(Duration),
}

/// What `restore` put back into the stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub gauges: usize,
    pub counters: usize,
    /// Records dropped as corrupt.
    pub skipped: usize,
}

/// Bridges the in-memory stores and the snapshot backend.
///
/// Without a backend every operation is a no-op.
pub struct PersistenceOperator {
    gauges: Arc<dyn MetricStore<Gauge>>,
    counters: Arc<dyn MetricStore<Counter>>,
    backend: Option<Arc<dyn SnapshotBackend>>,
    policy: SnapshotPolicy,
    // serializes capture+write so snapshots land in capture order
    write_lock: Mutex<()>,
}

impl PersistenceOperator {
    pub fn new(
        gauges: Arc<dyn MetricStore<Gauge>>,
        counters: Arc<dyn MetricStore<Counter>>,
        backend: Option<Arc<dyn SnapshotBackend>>,
        policy: SnapshotPolicy,
    ) -> Self {
        Self {
            gauges,
            counters,
            backend,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn policy(&self) -> SnapshotPolicy {
        self.policy
    }

    /// Load the last snapshot into the stores. Never fails: a missing or
    /// unreadable snapshot means an empty start.
    pub async fn restore(&self) -> RestoreReport {
        let Some(backend) = &self.backend else {
            return RestoreReport::default();
        };

        let decoded = match backend.load().await {
            Ok(Some(decoded)) => decoded,
            Ok(None) => {
                tracing::info!(backend = %backend.describe(), "no snapshot found, starting empty");
                return RestoreReport::default();
            }
            Err(e) => {
                tracing::warn!(backend = %backend.describe(), error = %e, "snapshot unreadable, starting empty");
                return RestoreReport::default();
            }
        };

        decoded
            .snapshot
            .apply_to(self.gauges.as_ref(), self.counters.as_ref());

        let report = RestoreReport {
            gauges: decoded.snapshot.gauges.len(),
            counters: decoded.snapshot.counters.len(),
            skipped: decoded.skipped,
        };
        if report.skipped > 0 {
            tracing::warn!(backend = %backend.describe(), skipped = report.skipped, "snapshot contained corrupt records");
        }
        tracing::info!(
            backend = %backend.describe(),
            gauges = report.gauges,
            counters = report.counters,
            "metrics restored"
        );
        report
    }

    /// Capture both stores and hand the copy to the backend.
    ///
    /// Store locks are released before any I/O starts.
    pub async fn snapshot(&self) -> Result<()> {
        let Some(backend) = &self.backend else {
            return Ok(());
        };
        let _guard = self.write_lock.lock().await;
        let snap = Snapshot::capture(self.gauges.as_ref(), self.counters.as_ref());
        backend.store(&snap).await?;
        tracing::debug!(metrics = snap.len(), "snapshot written");
        Ok(())
    }

    /// Hook for handlers, called after the in-memory mutation is applied.
    ///
    /// Under the synchronous policy the snapshot runs on its own task: the
    /// caller waits for it, but if the caller is cancelled the write still
    /// finishes. Failures are logged, never returned.
    pub async fn after_mutation(self: &Arc<Self>) {
        if self.policy != SnapshotPolicy::Synchronous || !self.is_enabled() {
            return;
        }
        let op = Arc::clone(self);
        let task = tokio::spawn(async move { op.snapshot().await });
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "synchronous snapshot failed"),
            Err(e) => tracing::warn!(error = %e, "synchronous snapshot task aborted"),
        }
    }

    /// Start the interval writer for the periodic policy.
    ///
    /// Returns `None` when the policy is synchronous or persistence is off.
    /// The task exits when `shutdown` flips to `true` or its sender drops.
    pub fn spawn_periodic(
        self: &Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Option<JoinHandle<()>> {
        let SnapshotPolicy::Periodic(every) = self.policy else {
            return None;
        };
        if !self.is_enabled() {
            return None;
        }

        let op = Arc::clone(self);
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = op.snapshot().await {
                            tracing::warn!(error = %e, "periodic snapshot failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("periodic snapshot task stopped");
        }))
    }

    /// Final write on graceful shutdown.
    pub async fn flush(&self) {
        if !self.is_enabled() {
            return;
        }
        match self.snapshot().await {
            Ok(()) => tracing::info!("final snapshot flushed"),
            Err(e) => tracing::error!(error = %e, "final snapshot failed"),
        }
    }

    pub async fn ping(&self) -> Result<()> {
        match &self.backend {
            Some(b) => b.ping().await,
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for PersistenceOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceOperator")
            .field("backend", &self.backend.as_ref().map(|b| b.describe()))
            .field("policy", &self.policy)
            .finish()
    }
}
