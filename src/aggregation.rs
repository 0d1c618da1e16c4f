// Per-target aggregation: raw samples → TargetKey → summed integer metrics.
// Pure; the caller owns the returned map.

use crate::models::{AggregatedMetrics, RawSample};

/// How the domain part of a cluster name is treated when building a TargetKey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomainMode {
    /// Remove only literal `.+` substrings; dotted names keep their dots.
    #[default]
    Literal,
    /// Keep the text before the first `.` (e.g. `prod.corp.example.com` → `prod`).
    Strip,
}

/// Cluster name as it appears in a Graphite path: spaces become dashes, then the
/// domain is handled according to `mode`.
pub fn sanitize_host(cluster: &str, mode: DomainMode) -> String {
    let host = cluster.replace(' ', "-");
    match mode {
        DomainMode::Literal => host.replace(".+", ""),
        DomainMode::Strip => match host.split_once('.') {
            Some((head, _)) => head.to_string(),
            None => host,
        },
    }
}

/// `<site>.<sanitized cluster>`.
pub fn target_key(site: &str, cluster: &str, mode: DomainMode) -> String {
    format!("{}.{}", site, sanitize_host(cluster, mode))
}

/// Sums every numeric field per target. Samples without a `TargetCluster` are skipped.
/// A target with no numeric fields never gets an entry. Accumulation saturates at the
/// `i64` bounds.
pub fn aggregate(samples: &[RawSample], site: &str, mode: DomainMode) -> AggregatedMetrics {
    let mut targets = AggregatedMetrics::new();
    for sample in samples {
        let Some(cluster) = sample.target_cluster() else {
            continue;
        };
        let key = target_key(site, cluster, mode);
        for (field, value) in sample.numeric_fields() {
            // Entry created on the first numeric field only; no empty targets.
            targets
                .entry(key.clone())
                .or_default()
                .entry(field.to_string())
                .and_modify(|acc| *acc = acc.saturating_add(value))
                .or_insert(value);
        }
    }
    targets
}
