//! metrix core: metric value types, the concurrent metric store, the wire
//! codec, and the snapshot format.
//!
//! This crate carries no transport or runtime dependencies so it can be reused
//! by the HTTP server, by tooling that inspects snapshot files, and by tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `MetrixError`/`Result` so a malformed
//! request or a damaged snapshot never takes the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metric;
pub mod protocol;
pub mod snapshot;
pub mod store;

/// Shared result type.
pub use error::{Result, MetrixError};
pub use metric::{Counter, Gauge, MetricKind, MetricValue};
pub use snapshot::Snapshot;
pub use store::{MemStore, MetricStore};
