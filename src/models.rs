// Domain models: raw ZVM resource samples and the per-target aggregate.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Field that names the destination cluster of a sample.
pub const TARGET_CLUSTER_FIELD: &str = "TargetCluster";

/// One record from `ResourcesReport/getSamples`: a single reporting window for a
/// single VM. Kept as the raw JSON object so every field keeps its tagged type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawSample(Map<String, Value>);

impl RawSample {
    /// Destination cluster, or `None` when the field is missing, empty or not a string.
    pub fn target_cluster(&self) -> Option<&str> {
        match self.0.get(TARGET_CLUSTER_FIELD) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Fields whose value is a JSON number, truncated toward zero.
    /// Booleans, strings, nulls, arrays and objects are skipped.
    pub fn numeric_fields(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().filter_map(|(key, value)| match value {
            Value::Number(n) => Some((key.as_str(), truncate_number(n))),
            _ => None,
        })
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RawSample {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Integer value of a JSON number. Floats truncate toward zero; values outside
/// the `i64` range saturate.
pub fn truncate_number(n: &Number) -> i64 {
    if let Some(i) = n.as_i64() {
        i
    } else if let Some(u) = n.as_u64() {
        i64::try_from(u).unwrap_or(i64::MAX)
    } else {
        // `as` truncates toward zero and saturates at the bounds.
        n.as_f64().map_or(0, |f| f as i64)
    }
}

/// Metric name → accumulated value for one target.
pub type TargetMetrics = BTreeMap<String, i64>;

/// TargetKey (`<site>.<host>`) → metrics. Ordered so emission is deterministic.
pub type AggregatedMetrics = BTreeMap<String, TargetMetrics>;
