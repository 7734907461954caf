use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::bout::Bout;
use crate::error::{Error, Result};
use crate::labels::Ruleset;
use crate::metrics::{MetricKind, metric_value};

/// Bouts older than this many days before the latest bout form the history.
pub const TREND_WINDOW_DAYS: i64 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Trend {
    pub current: f64,
    pub baseline: f64,
    pub percent_change: f64,
}

pub fn trend_cutoff(bouts: &[Bout]) -> Option<NaiveDate> {
    bouts
        .iter()
        .map(Bout::date)
        .max()
        .map(|latest| latest - Duration::days(TREND_WINDOW_DAYS))
}

pub fn percent_change(current: Option<f64>, baseline: Option<f64>) -> Result<f64> {
    let Some(current) = current else {
        return Err(Error::InsufficientData("current value unavailable".to_string()));
    };
    match baseline {
        None => Err(Error::InsufficientData("no historical value".to_string())),
        Some(b) if b == 0.0 || !b.is_finite() => Err(Error::InsufficientData(format!(
            "historical value {b} cannot anchor a percent change"
        ))),
        Some(b) => Ok((current - b) / b * 100.0),
    }
}

/// Current value over all bouts against the same metric over bouts before the cutoff.
pub fn metric_trend(kind: MetricKind, ruleset: Ruleset, bouts: &[Bout]) -> Result<Trend> {
    let Some(cutoff) = trend_cutoff(bouts) else {
        return Err(Error::InsufficientData("no bouts".to_string()));
    };
    let current = metric_value(kind, ruleset, bouts);
    let history = bouts.iter().filter(|b| b.date() < cutoff);
    let baseline = metric_value(kind, ruleset, history);
    // Count metrics over an empty history come back as Some(0).
    let change = percent_change(current, baseline)?;
    Ok(Trend {
        current: current.unwrap_or_default(),
        baseline: baseline.unwrap_or_default(),
        percent_change: change,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_or_missing_baseline_is_insufficient() {
        assert!(matches!(
            percent_change(Some(2.0), Some(0.0)),
            Err(Error::InsufficientData(_))
        ));
        assert!(matches!(
            percent_change(Some(2.0), None),
            Err(Error::InsufficientData(_))
        ));
        assert!(matches!(
            percent_change(None, Some(1.0)),
            Err(Error::InsufficientData(_))
        ));
        assert_eq!(percent_change(Some(3.0), Some(2.0)).unwrap(), 50.0);
    }
}
