//! Metric value types and the closed set of metric kinds.
//!
//! A gauge is a point-in-time float that is replaced on every write. A counter
//! is a signed integer that accumulates deltas. Each type knows its own
//! combination rule through [`MetricValue::merge`], so the store can apply an
//! update atomically without knowing which kind it holds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MetrixError, Result};

/// Metric kind as it appears in URLs and in the `type` field of wire records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gauge" => Ok(MetricKind::Gauge),
            "counter" => Ok(MetricKind::Counter),
            _ => Err(MetrixError::BadRequest(
                "metric type should be \"gauge\" or \"counter\"".into(),
            )),
        }
    }
}

/// A value that can live in a [`crate::store::MemStore`].
pub trait MetricValue:
    Copy + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Kind tag used when the value crosses the wire.
    const KIND: MetricKind;

    /// Combine the stored value with an incoming update.
    fn merge(self, incoming: Self) -> Self;
}

/// Last-write-wins float metric.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gauge(pub f64);

impl Gauge {
    /// Build a gauge, rejecting NaN and infinities (they have no JSON form).
    pub fn new(v: f64) -> Result<Self> {
        if !v.is_finite() {
            return Err(MetrixError::BadRequest("gauge value must be finite".into()));
        }
        Ok(Gauge(v))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl MetricValue for Gauge {
    const KIND: MetricKind = MetricKind::Gauge;

    fn merge(self, incoming: Self) -> Self {
        incoming
    }
}

// `{}` on f64 is the shortest form that round-trips: 37.1 -> "37.1", 5.0 -> "5".
impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Accumulating integer metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counter(pub i64);

impl Counter {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl MetricValue for Counter {
    const KIND: MetricKind = MetricKind::Counter;

    /// Wraps on overflow.
    fn merge(self, incoming: Self) -> Self {
        Counter(self.0.wrapping_add(incoming.0))
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_only_known_names() {
        assert_eq!("gauge".parse::<MetricKind>().unwrap(), MetricKind::Gauge);
        assert_eq!("counter".parse::<MetricKind>().unwrap(), MetricKind::Counter);
        for bad in ["", "Gauge", "histogram", "counter "] {
            let err = bad.parse::<MetricKind>().unwrap_err();
            assert_eq!(err.client_code().as_str(), "BAD_REQUEST", "input={bad:?}");
        }
    }

    #[test]
    fn gauge_merge_replaces() {
        assert_eq!(Gauge(36.6).merge(Gauge(37.1)), Gauge(37.1));
    }

    #[test]
    fn counter_merge_adds() {
        assert_eq!(Counter(5).merge(Counter(3)), Counter(8));
        assert_eq!(Counter(5).merge(Counter(-7)), Counter(-2));
    }

    #[test]
    fn gauge_display_is_shortest_form() {
        assert_eq!(Gauge(37.1).to_string(), "37.1");
        assert_eq!(Gauge(5.0).to_string(), "5");
        assert_eq!(Gauge(-0.25).to_string(), "-0.25");
    }

    #[test]
    fn gauge_rejects_non_finite() {
        assert!(Gauge::new(f64::NAN).is_err());
        assert!(Gauge::new(f64::INFINITY).is_err());
        assert_eq!(Gauge::new(1.5).unwrap(), Gauge(1.5));
    }
}
