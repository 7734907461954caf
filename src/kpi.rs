use serde::Serialize;

use crate::baseline::BaselineSet;
use crate::bout::Bout;
use crate::labels::Ruleset;
use crate::metrics::{MetricKind, metric_value};
use crate::percentile::{RankBucket, Subject};
use crate::trend::metric_trend;

/// Consumer-facing metric card. Every numeric field is optional; an absent value
/// means "unavailable", never zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRecord {
    pub key: MetricKind,
    pub label: String,
    pub value: Option<f64>,
    pub percent_change: Option<f64>,
    pub percentile: Option<f64>,
    pub rank: Option<RankBucket>,
}

pub fn build_metric_record(
    kind: MetricKind,
    ruleset: Ruleset,
    subject: Subject,
    bouts: &[Bout],
    baselines: &BaselineSet,
) -> MetricRecord {
    let value = metric_value(kind, ruleset, bouts);

    let percent_change = match metric_trend(kind, ruleset, bouts) {
        Ok(trend) => Some(trend.percent_change),
        Err(err) => {
            tracing::debug!(metric = kind.key(), "no trend: {err}");
            None
        }
    };

    let ranking = value.and_then(|v| match baselines.rank(ruleset, subject, kind, v) {
        Ok(r) => Some(r),
        Err(err) => {
            tracing::debug!(metric = kind.key(), "no ranking: {err}");
            None
        }
    });

    MetricRecord {
        key: kind,
        label: kind.label().to_string(),
        value,
        percent_change,
        percentile: ranking.map(|r| r.percentile),
        rank: ranking.map(|r| r.rank),
    }
}

pub fn build_metric_records(
    ruleset: Ruleset,
    subject: Subject,
    bouts: &[Bout],
    baselines: &BaselineSet,
) -> Vec<MetricRecord> {
    MetricKind::ALL
        .into_iter()
        .map(|kind| build_metric_record(kind, ruleset, subject, bouts, baselines))
        .collect()
}
