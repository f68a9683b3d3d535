//! HTTP handlers.
//!
//! `plain` serves path-encoded updates and text values, `json` serves wire
//! records. Both go through the same `AppState` operations.

pub mod error;
pub mod json;
pub mod plain;

pub use error::ApiError;
