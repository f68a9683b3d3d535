//! Plain-text values carried in URL path segments.

use crate::error::{MetrixError, Result};
use crate::metric::{Counter, Gauge};

/// Parse a gauge value such as `36.6`.
pub fn parse_gauge(s: &str) -> Result<Gauge> {
    let v: f64 = s
        .parse()
        .map_err(|_| MetrixError::BadRequest("value should be float".into()))?;
    Gauge::new(v)
}

/// Parse a counter delta such as `5` or `-3`.
pub fn parse_counter(s: &str) -> Result<Counter> {
    s.parse()
        .map(Counter)
        .map_err(|_| MetrixError::BadRequest("value should be int".into()))
}
