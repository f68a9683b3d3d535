//! JSON wire record.
//!
//! `Metrics` is the loose serde shape exactly as clients send it. `Metric` is
//! the validated form: the kind is a closed enum and the value field that
//! matches it is guaranteed present. Conversion between the two is the only
//! place where shape errors are detected.

use serde::{Deserialize, Serialize};

use crate::error::{MetrixError, Result};
use crate::metric::{Counter, Gauge, MetricKind};

/// Wire record: `{"id", "type", "value"?, "delta"?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub id: String,
    /// Field name is `type` in JSON.
    #[serde(rename = "type")]
    pub mtype: String,
    /// Present only for gauges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Present only for counters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,
}

impl Metrics {
    pub fn gauge(id: impl Into<String>, value: Gauge) -> Self {
        Metric::Gauge { id: id.into(), value }.into()
    }

    pub fn counter(id: impl Into<String>, delta: Counter) -> Self {
        Metric::Counter { id: id.into(), delta }.into()
    }
}

/// Validated metric.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    Gauge { id: String, value: Gauge },
    Counter { id: String, delta: Counter },
}

impl Metric {
    pub fn id(&self) -> &str {
        match self {
            Metric::Gauge { id, .. } | Metric::Counter { id, .. } => id,
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::Gauge { .. } => MetricKind::Gauge,
            Metric::Counter { .. } => MetricKind::Counter,
        }
    }

    /// Value as rendered by the plain-text endpoints.
    pub fn value_text(&self) -> String {
        match self {
            Metric::Gauge { value, .. } => value.to_string(),
            Metric::Counter { delta, .. } => delta.to_string(),
        }
    }
}

impl TryFrom<Metrics> for Metric {
    type Error = MetrixError;

    fn try_from(m: Metrics) -> Result<Self> {
        if m.id.is_empty() {
            return Err(MetrixError::BadRequest("metric id must not be empty".into()));
        }
        match m.mtype.parse::<MetricKind>()? {
            MetricKind::Gauge => {
                let v = m
                    .value
                    .ok_or_else(|| MetrixError::BadRequest("gauge requires value".into()))?;
                Ok(Metric::Gauge {
                    id: m.id,
                    value: Gauge::new(v)?,
                })
            }
            MetricKind::Counter => {
                let d = m
                    .delta
                    .ok_or_else(|| MetrixError::BadRequest("counter requires delta".into()))?;
                Ok(Metric::Counter {
                    id: m.id,
                    delta: Counter(d),
                })
            }
        }
    }
}

impl From<Metric> for Metrics {
    fn from(m: Metric) -> Self {
        match m {
            Metric::Gauge { id, value } => Metrics {
                id,
                mtype: MetricKind::Gauge.as_str().to_owned(),
                value: Some(value.get()),
                delta: None,
            },
            Metric::Counter { id, delta } => Metrics {
                id,
                mtype: MetricKind::Counter.as_str().to_owned(),
                value: None,
                delta: Some(delta.get()),
            },
        }
    }
}

/// Lookup body: `{"id", "type"}`. Any value/delta sent along is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricQuery {
    pub id: String,
    #[serde(rename = "type")]
    pub mtype: String,
}

impl MetricQuery {
    pub fn kind(&self) -> Result<MetricKind> {
        self.mtype.parse()
    }
}

/// Decode and validate one JSON record.
pub fn decode_metric(bytes: &[u8]) -> Result<Metric> {
    let raw: Metrics = serde_json::from_slice(bytes)
        .map_err(|e| MetrixError::BadRequest(format!("invalid metric json: {e}")))?;
    Metric::try_from(raw)
}

/// Decode a lookup request.
pub fn decode_query(bytes: &[u8]) -> Result<MetricQuery> {
    serde_json::from_slice(bytes)
        .map_err(|e| MetrixError::BadRequest(format!("invalid query json: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encode_omits_unused_field() {
        let g = serde_json::to_value(Metrics::gauge("temp", Gauge(37.1))).unwrap();
        assert_eq!(g, serde_json::json!({"id": "temp", "type": "gauge", "value": 37.1}));

        let c = serde_json::to_value(Metrics::counter("hits", Counter(8))).unwrap();
        assert_eq!(c, serde_json::json!({"id": "hits", "type": "counter", "delta": 8}));
    }

    #[test]
    fn null_fields_are_missing_not_zero() {
        let err = decode_metric(br#"{"id":"t","type":"gauge","value":null}"#).unwrap_err();
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
        let err = decode_metric(br#"{"id":"h","type":"counter","delta":null}"#).unwrap_err();
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    }

    #[test]
    fn mismatched_field_is_rejected() {
        // a counter carrying only `value` is still missing its delta
        let err = decode_metric(br#"{"id":"h","type":"counter","value":3}"#).unwrap_err();
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
    }

    #[test]
    fn query_ignores_value_fields() {
        let q = decode_query(br#"{"id":"h","type":"counter","delta":1}"#).unwrap();
        assert_eq!(q.id, "h");
        assert_eq!(q.kind().unwrap(), MetricKind::Counter);
        assert!(decode_query(br#"{"id":"h","type":"summary"}"#).unwrap().kind().is_err());
    }
}
