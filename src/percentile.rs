use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whose population a value is ranked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Individual,
    Team,
}

impl Subject {
    /// File stem used by the on-disk baseline layout.
    pub fn file_stem(self) -> &'static str {
        match self {
            Subject::Individual => "wrestler",
            Subject::Team => "team",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Individual => f.write_str("individual"),
            Subject::Team => f.write_str("team"),
        }
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "individual" | "wrestler" | "athlete" => Ok(Subject::Individual),
            "team" => Ok(Subject::Team),
            _ => Err(format!("unknown subject {raw:?}")),
        }
    }
}

/// Percentile of `value` within `sample`, averaging the strict and weak ranks so
/// ties land in the middle of their block. Non-finite sample entries are ignored.
/// Returns `None` for an empty sample.
pub fn percentile_of_score(sample: &[f64], value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let mut n = 0usize;
    let mut below = 0usize;
    let mut at_or_below = 0usize;
    for v in sample.iter().copied().filter(|v| v.is_finite()) {
        n += 1;
        if v < value {
            below += 1;
        }
        if v <= value {
            at_or_below += 1;
        }
    }
    if n == 0 {
        return None;
    }
    let tie_bonus = usize::from(at_or_below > below);
    Some((below + at_or_below + tie_bonus) as f64 * 50.0 / n as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RankBucket {
    Poor,
    #[serde(rename = "Below Average")]
    BelowAverage,
    #[serde(rename = "Above Average")]
    AboveAverage,
    Great,
    Excellent,
}

impl RankBucket {
    /// Upper bounds are inclusive: exactly 25.0 is still `Poor`.
    pub fn from_percentile(p: f64) -> RankBucket {
        if p <= 25.0 {
            RankBucket::Poor
        } else if p <= 50.0 {
            RankBucket::BelowAverage
        } else if p <= 75.0 {
            RankBucket::AboveAverage
        } else if p <= 90.0 {
            RankBucket::Great
        } else {
            RankBucket::Excellent
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RankBucket::Poor => "Poor",
            RankBucket::BelowAverage => "Below Average",
            RankBucket::AboveAverage => "Above Average",
            RankBucket::Great => "Great",
            RankBucket::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for RankBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averaged_rank_matches_reference_values() {
        let sample = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile_of_score(&sample, 3.0), Some(75.0));
        assert_eq!(percentile_of_score(&sample, 0.5), Some(0.0));
        assert_eq!(percentile_of_score(&sample, 10.0), Some(100.0));
        // Between entries, no tie: plain fraction below.
        assert_eq!(percentile_of_score(&sample, 2.5), Some(50.0));

        let tied = [1.0, 2.0, 2.0, 3.0];
        assert_eq!(percentile_of_score(&tied, 2.0), Some(62.5));
    }

    #[test]
    fn empty_sample_has_no_percentile() {
        assert_eq!(percentile_of_score(&[], 1.0), None);
        assert_eq!(percentile_of_score(&[f64::NAN], 1.0), None);
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(RankBucket::from_percentile(25.0), RankBucket::Poor);
        assert_eq!(RankBucket::from_percentile(25.0001), RankBucket::BelowAverage);
        assert_eq!(RankBucket::from_percentile(50.0), RankBucket::BelowAverage);
        assert_eq!(RankBucket::from_percentile(75.0), RankBucket::AboveAverage);
        assert_eq!(RankBucket::from_percentile(90.0), RankBucket::Great);
        assert_eq!(RankBucket::from_percentile(100.0), RankBucket::Excellent);
    }
}
