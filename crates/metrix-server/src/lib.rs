//! metrix server library entry.
//!
//! Wires config, the metric stores, persistence, and the HTTP surface into a
//! server. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod handlers;
pub mod ops;
pub mod persistence;
pub mod router;
