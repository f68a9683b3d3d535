//! Durable snapshots of the metric stores.
//!
//! The operator owns *when* a snapshot is written (after every mutation or on
//! an interval) and restores the stores at boot. Backends own *where* it goes.

mod backend;
mod operator;

pub use backend::{FileBackend, SnapshotBackend};
pub use operator::{PersistenceOperator, RestoreReport, SnapshotPolicy};
