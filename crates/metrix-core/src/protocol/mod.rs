//! Wire formats for metrics.
//!
//! - JSON records (`{id, type, value|delta}`) used by the structured HTTP
//!   endpoints and by the snapshot file.
//! - Plain-text values used by the path-encoded endpoints.
//!
//! Decoders never panic: malformed input is reported as
//! `MetrixError::BadRequest`.

pub mod text;
pub mod wire;

pub use wire::{decode_metric, decode_query, Metric, MetricQuery, Metrics};
