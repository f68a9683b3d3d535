//! Shared application state for the metrix server.
//!
//! Built once in `main` after config is resolved and cloned into every
//! handler. Holds the two stores and the persistence operator; handlers never
//! touch the snapshot backend directly.

use std::sync::Arc;

use metrix_core::error::{MetrixError, Result};
use metrix_core::protocol::{Metric, Metrics};
use metrix_core::{Counter, Gauge, MemStore, MetricKind, MetricStore, Snapshot};

use crate::config::ServerConfig;
use crate::persistence::{FileBackend, PersistenceOperator, RestoreReport, SnapshotBackend};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    persistence: Arc<PersistenceOperator>,
}

struct AppStateInner {
    cfg: ServerConfig,
    gauges: Arc<dyn MetricStore<Gauge>>,
    counters: Arc<dyn MetricStore<Counter>>,
}

impl AppState {
    /// Build state with the backend selected by `cfg.storage`.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        if !cfg.storage.database_dsn.trim().is_empty() {
            tracing::warn!("database_dsn is set but no database backend is available; ignoring it");
        }

        let backend: Option<Arc<dyn SnapshotBackend>> = match cfg.storage.snapshot_path() {
            Some(path) => {
                let b = FileBackend::new(path);
                tracing::info!(backend = %b.describe(), policy = ?cfg.storage.snapshot_policy(), "persistence enabled");
                Some(Arc::new(b))
            }
            None => {
                tracing::info!("persistence disabled");
                None
            }
        };

        Ok(Self::with_backend(cfg, backend))
    }

    /// Build state with an explicit backend (`None` disables persistence).
    pub fn with_backend(cfg: ServerConfig, backend: Option<Arc<dyn SnapshotBackend>>) -> Self {
        let gauges: Arc<dyn MetricStore<Gauge>> = Arc::new(MemStore::<Gauge>::new());
        let counters: Arc<dyn MetricStore<Counter>> = Arc::new(MemStore::<Counter>::new());

        let persistence = Arc::new(PersistenceOperator::new(
            Arc::clone(&gauges),
            Arc::clone(&counters),
            backend,
            cfg.storage.snapshot_policy(),
        ));

        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                gauges,
                counters,
            }),
            persistence,
        }
    }

    /// Restore from the last snapshot when `storage.restore` is on.
    /// Must run before the router starts accepting traffic.
    pub async fn restore_if_enabled(&self) -> RestoreReport {
        if !self.cfg().storage.restore {
            return RestoreReport::default();
        }
        self.persistence.restore().await
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn gauges(&self) -> &dyn MetricStore<Gauge> {
        self.inner.gauges.as_ref()
    }

    pub fn counters(&self) -> &dyn MetricStore<Counter> {
        self.inner.counters.as_ref()
    }

    pub fn persistence(&self) -> &Arc<PersistenceOperator> {
        &self.persistence
    }

    /// Apply one update and return the stored result (for counters, the new
    /// total). The mutation is visible before any snapshot starts.
    pub async fn apply(&self, metric: Metric) -> Metric {
        let stored = match metric {
            Metric::Gauge { id, value } => {
                let value = self.gauges().update(&id, value);
                Metric::Gauge { id, value }
            }
            Metric::Counter { id, delta } => {
                let delta = self.counters().update(&id, delta);
                Metric::Counter { id, delta }
            }
        };
        self.persistence.after_mutation().await;
        stored
    }

    /// Current value by kind and name.
    pub fn lookup(&self, kind: MetricKind, name: &str) -> Result<Metric> {
        let found = match kind {
            MetricKind::Gauge => self.gauges().get(name).map(|value| Metric::Gauge {
                id: name.to_owned(),
                value,
            }),
            MetricKind::Counter => self.counters().get(name).map(|delta| Metric::Counter {
                id: name.to_owned(),
                delta,
            }),
        };
        found.ok_or_else(|| MetrixError::NotFound(format!("{kind} {name}")))
    }

    /// Plain-text dump: counters, a blank line, then gauges.
    pub fn render_text(&self) -> String {
        format!("{}\n\n{}", self.counters().render(), self.gauges().render())
    }

    /// Every metric as a wire record, counters first.
    pub fn all_records(&self) -> Vec<Metrics> {
        Snapshot::capture(self.gauges(), self.counters())
            .records()
            .collect()
    }
}
