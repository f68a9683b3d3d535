//! Point-in-time copy of both stores and its on-disk encoding.
//!
//! Encoding is JSON Lines: one wire record per line, counters first, then
//! gauges, each ordered by name. Records are independent, so a damaged line
//! costs only that metric on decode.

use std::collections::BTreeMap;
use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{MetrixError, Result};
use crate::metric::{Counter, Gauge};
use crate::protocol::wire::{decode_metric, Metric, Metrics};
use crate::store::MetricStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub gauges: BTreeMap<String, Gauge>,
    pub counters: BTreeMap<String, Counter>,
}

/// Result of decoding a snapshot file.
#[derive(Debug, Default)]
pub struct DecodedSnapshot {
    pub snapshot: Snapshot,
    /// Number of lines that failed to decode and were dropped.
    pub skipped: usize,
}

impl Snapshot {
    /// Copy the current contents of both stores.
    pub fn capture<G, C>(gauges: &G, counters: &C) -> Self
    where
        G: MetricStore<Gauge> + ?Sized,
        C: MetricStore<Counter> + ?Sized,
    {
        Self {
            gauges: gauges.get_all(),
            counters: counters.get_all(),
        }
    }

    /// Write every entry into the stores with `set` (values are restored
    /// verbatim, counters are not accumulated).
    pub fn apply_to<G, C>(&self, gauges: &G, counters: &C)
    where
        G: MetricStore<Gauge> + ?Sized,
        C: MetricStore<Counter> + ?Sized,
    {
        for (name, v) in &self.gauges {
            gauges.set(name, *v);
        }
        for (name, v) in &self.counters {
            counters.set(name, *v);
        }
    }

    pub fn len(&self) -> usize {
        self.gauges.len() + self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gauges.is_empty() && self.counters.is_empty()
    }

    /// Wire records, counters first.
    pub fn records(&self) -> impl Iterator<Item = Metrics> + '_ {
        let counters = self
            .counters
            .iter()
            .map(|(id, d)| Metrics::counter(id.clone(), *d));
        let gauges = self
            .gauges
            .iter()
            .map(|(id, v)| Metrics::gauge(id.clone(), *v));
        counters.chain(gauges)
    }

    /// Serialize as JSON Lines.
    pub fn encode(&self) -> Result<Bytes> {
        let mut w = BytesMut::new().writer();
        for rec in self.records() {
            serde_json::to_writer(&mut w, &rec)
                .map_err(|e| MetrixError::Internal(format!("encode snapshot record: {e}")))?;
            w.write_all(b"\n")?;
        }
        Ok(w.into_inner().freeze())
    }

    /// Decode JSON Lines, keeping every record that parses.
    ///
    /// A name repeated in the input keeps its last occurrence.
    pub fn decode(s: &str) -> DecodedSnapshot {
        let mut out = DecodedSnapshot::default();
        for (idx, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match decode_metric(line.as_bytes()) {
                Ok(Metric::Gauge { id, value }) => {
                    out.snapshot.gauges.insert(id, value);
                }
                Ok(Metric::Counter { id, delta }) => {
                    out.snapshot.counters.insert(id, delta);
                }
                Err(e) => {
                    tracing::warn!(line = idx + 1, error = %e, "skipping corrupt snapshot record");
                    out.skipped += 1;
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn populated() -> (MemStore<Gauge>, MemStore<Counter>) {
        let g = MemStore::new();
        let c = MemStore::new();
        g.set("temp", Gauge(37.1));
        g.set("load", Gauge(0.5));
        c.set("hits", Counter(8));
        // same name in both namespaces
        c.set("temp", Counter(-4));
        (g, c)
    }

    #[test]
    fn restore_into_fresh_stores_is_identical() {
        let (g, c) = populated();
        let encoded = Snapshot::capture(&g, &c).encode().unwrap();

        let decoded = Snapshot::decode(std::str::from_utf8(&encoded).unwrap());
        assert_eq!(decoded.skipped, 0);

        let (g2, c2) = (MemStore::<Gauge>::new(), MemStore::<Counter>::new());
        decoded.snapshot.apply_to(&g2, &c2);
        assert_eq!(g2.get_all(), g.get_all());
        assert_eq!(c2.get_all(), c.get_all());
    }

    #[test]
    fn encoding_puts_counters_first() {
        let (g, c) = populated();
        let encoded = Snapshot::capture(&g, &c).encode().unwrap();
        let text = std::str::from_utf8(&encoded).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], r#"{"id":"hits","type":"counter","delta":8}"#);
        assert_eq!(lines[2], r#"{"id":"load","type":"gauge","value":0.5}"#);
    }

    #[test]
    fn corrupt_lines_are_skipped() {
        let input = concat!(
            "{\"id\":\"hits\",\"type\":\"counter\",\"delta\":3}\n",
            "{\"id\":\"broken\",\"type\":\"counter\"\n",
            "not json at all\n",
            "\n",
            "{\"id\":\"temp\",\"type\":\"gauge\",\"value\":1.5}\n",
            "{\"id\":\"x\",\"type\":\"histogram\",\"value\":1}\n",
        );
        let decoded = Snapshot::decode(input);
        assert_eq!(decoded.skipped, 3);
        assert_eq!(decoded.snapshot.counters["hits"], Counter(3));
        assert_eq!(decoded.snapshot.gauges["temp"], Gauge(1.5));
        assert_eq!(decoded.snapshot.len(), 2);
    }

    #[test]
    fn restore_sets_instead_of_accumulating() {
        let c = MemStore::<Counter>::new();
        c.set("hits", Counter(100));
        let snap = Snapshot {
            counters: [("hits".to_string(), Counter(8))].into_iter().collect(),
            ..Snapshot::default()
        };
        snap.apply_to(&MemStore::<Gauge>::new(), &c);
        assert_eq!(c.get("hits"), Some(Counter(8)));
    }
}
