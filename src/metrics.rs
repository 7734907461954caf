use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bout::Bout;
use crate::event::Side;
use crate::labels::{Label, Ruleset};

/// Summed opportunity/count vector over any number of bouts.
///
/// All fields are plain counts so that summing is exact; the order in which bouts
/// are folded never changes the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionTally {
    pub focus_takedowns: u32,
    pub opp_takedowns: u32,
    pub focus_escapes: u32,
    pub opp_escapes: u32,
    pub focus_reversals: u32,
    pub opp_reversals: u32,
    pub focus_near2: u32,
    pub opp_near2: u32,
    /// N4 in college, N3 in high school.
    pub focus_near_high: u32,
    pub opp_near_high: u32,
    pub focus_bottom_choices: u32,
    pub opp_bottom_choices: u32,
    pub focus_top_choices: u32,
    pub opp_top_choices: u32,
    pub focus_neutral_choices: u32,
    pub opp_neutral_choices: u32,
    pub overtime_count: u32,
}

impl PositionTally {
    pub fn from_bout(bout: &Bout) -> Self {
        let high = bout.ruleset().high_near_fall();
        let f = |label| bout.count(Side::Focus, label);
        let o = |label| bout.count(Side::Opponent, label);
        Self {
            focus_takedowns: f(Label::Takedown),
            opp_takedowns: o(Label::Takedown),
            focus_escapes: f(Label::Escape),
            opp_escapes: o(Label::Escape),
            focus_reversals: f(Label::Reversal),
            opp_reversals: o(Label::Reversal),
            focus_near2: f(Label::NearFall2),
            opp_near2: o(Label::NearFall2),
            focus_near_high: f(high),
            opp_near_high: o(high),
            focus_bottom_choices: f(Label::ChooseBottom),
            opp_bottom_choices: o(Label::ChooseBottom),
            focus_top_choices: f(Label::ChooseTop),
            opp_top_choices: o(Label::ChooseTop),
            focus_neutral_choices: f(Label::ChooseNeutral),
            opp_neutral_choices: o(Label::ChooseNeutral),
            overtime_count: u32::from(bout.overtime()),
        }
    }

    /// Parallel fold across a batch.
    pub fn par_sum(bouts: &[Bout]) -> Self {
        bouts
            .par_iter()
            .map(PositionTally::from_bout)
            .reduce(PositionTally::default, |a, b| a + b)
    }

    pub fn bottom_opportunities(&self) -> u32 {
        self.opp_takedowns + self.opp_reversals + self.focus_bottom_choices + self.opp_top_choices
    }

    pub fn top_opportunities(&self) -> u32 {
        self.focus_takedowns
            + self.focus_reversals
            + self.focus_top_choices
            + self.opp_bottom_choices
    }

    pub fn neutral_opportunities(&self) -> u32 {
        self.focus_escapes
            + self.opp_escapes
            + self.focus_neutral_choices
            + self.opp_neutral_choices
            + 1
            + self.overtime_count
    }

    pub fn bottom_points(&self, ruleset: Ruleset) -> Option<f64> {
        let w = high_weight(ruleset);
        let numerator = self.focus_escapes as f64 + 2.0 * self.focus_reversals as f64
            - 2.0 * self.opp_near2 as f64
            + w * self.opp_near_high as f64;
        ratio(numerator, self.bottom_opportunities())
    }

    pub fn top_points(&self, ruleset: Ruleset) -> Option<f64> {
        let w = high_weight(ruleset);
        let numerator = 2.0 * self.focus_near2 as f64 + w * self.focus_near_high as f64
            - self.opp_escapes as f64
            + 2.0 * self.opp_reversals as f64;
        ratio(numerator, self.top_opportunities())
    }

    pub fn neutral_points(&self) -> f64 {
        let numerator = 2.0 * (self.focus_takedowns as f64 - self.opp_takedowns as f64);
        numerator / self.neutral_opportunities() as f64
    }

    pub fn escape_pct(&self) -> Option<f64> {
        let escapes = (self.focus_escapes + self.focus_reversals) as f64;
        ratio(escapes, self.bottom_opportunities()).map(|r| r * 100.0)
    }

    pub fn turn_pct(&self) -> Option<f64> {
        let turns = (self.focus_near2 + self.focus_near_high) as f64;
        ratio(turns, self.top_opportunities()).map(|r| r * 100.0)
    }

    pub fn ride_pct(&self) -> Option<f64> {
        let lost = (self.opp_escapes + self.opp_reversals) as f64;
        ratio(lost, self.top_opportunities()).map(|r| (1.0 - r) * 100.0)
    }
}

fn high_weight(ruleset: Ruleset) -> f64 {
    ruleset.high_near_fall().points() as f64
}

fn ratio(numerator: f64, denominator: u32) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator / denominator as f64)
    }
}

impl Add for PositionTally {
    type Output = PositionTally;

    fn add(mut self, rhs: PositionTally) -> PositionTally {
        self += rhs;
        self
    }
}

impl AddAssign for PositionTally {
    fn add_assign(&mut self, rhs: PositionTally) {
        self.focus_takedowns += rhs.focus_takedowns;
        self.opp_takedowns += rhs.opp_takedowns;
        self.focus_escapes += rhs.focus_escapes;
        self.opp_escapes += rhs.opp_escapes;
        self.focus_reversals += rhs.focus_reversals;
        self.opp_reversals += rhs.opp_reversals;
        self.focus_near2 += rhs.focus_near2;
        self.opp_near2 += rhs.opp_near2;
        self.focus_near_high += rhs.focus_near_high;
        self.opp_near_high += rhs.opp_near_high;
        self.focus_bottom_choices += rhs.focus_bottom_choices;
        self.opp_bottom_choices += rhs.opp_bottom_choices;
        self.focus_top_choices += rhs.focus_top_choices;
        self.opp_top_choices += rhs.opp_top_choices;
        self.focus_neutral_choices += rhs.focus_neutral_choices;
        self.opp_neutral_choices += rhs.opp_neutral_choices;
        self.overtime_count += rhs.overtime_count;
    }
}

impl Sum for PositionTally {
    fn sum<I: Iterator<Item = PositionTally>>(iter: I) -> Self {
        iter.fold(PositionTally::default(), |a, b| a + b)
    }
}

impl<'a> Sum<&'a Bout> for PositionTally {
    fn sum<I: Iterator<Item = &'a Bout>>(iter: I) -> Self {
        iter.map(PositionTally::from_bout).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricKind {
    #[serde(rename = "matches")]
    Matches,
    #[serde(rename = "num_result")]
    NumericResult,
    #[serde(rename = "binary_result")]
    WinRate,
    #[serde(rename = "bonus")]
    BonusRate,
    #[serde(rename = "pin")]
    PinRate,
    #[serde(rename = "mov")]
    MarginOfVictory,
    #[serde(rename = "td_diff")]
    TakedownDiff,
    #[serde(rename = "neutral")]
    NeutralPoints,
    #[serde(rename = "bottom")]
    BottomPoints,
    #[serde(rename = "top")]
    TopPoints,
    #[serde(rename = "escape")]
    EscapePct,
    #[serde(rename = "ride")]
    RidePct,
    #[serde(rename = "turn")]
    TurnPct,
}

impl MetricKind {
    pub const ALL: [MetricKind; 13] = [
        MetricKind::Matches,
        MetricKind::NumericResult,
        MetricKind::WinRate,
        MetricKind::BonusRate,
        MetricKind::PinRate,
        MetricKind::MarginOfVictory,
        MetricKind::TakedownDiff,
        MetricKind::NeutralPoints,
        MetricKind::BottomPoints,
        MetricKind::TopPoints,
        MetricKind::EscapePct,
        MetricKind::RidePct,
        MetricKind::TurnPct,
    ];

    /// Stable key, shared with baseline files.
    pub fn key(self) -> &'static str {
        match self {
            MetricKind::Matches => "matches",
            MetricKind::NumericResult => "num_result",
            MetricKind::WinRate => "binary_result",
            MetricKind::BonusRate => "bonus",
            MetricKind::PinRate => "pin",
            MetricKind::MarginOfVictory => "mov",
            MetricKind::TakedownDiff => "td_diff",
            MetricKind::NeutralPoints => "neutral",
            MetricKind::BottomPoints => "bottom",
            MetricKind::TopPoints => "top",
            MetricKind::EscapePct => "escape",
            MetricKind::RidePct => "ride",
            MetricKind::TurnPct => "turn",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Matches => "# Matches",
            MetricKind::NumericResult => "Numeric Result",
            MetricKind::WinRate => "Win %",
            MetricKind::BonusRate => "Bonus %",
            MetricKind::PinRate => "Pin %",
            MetricKind::MarginOfVictory => "MoV",
            MetricKind::TakedownDiff => "Takedown Diff",
            MetricKind::NeutralPoints => "Neutral Pts",
            MetricKind::BottomPoints => "Bottom Pts",
            MetricKind::TopPoints => "Top Pts",
            MetricKind::EscapePct => "Escape %",
            MetricKind::RidePct => "Ride %",
            MetricKind::TurnPct => "Turn %",
        }
    }

    /// True for the ratio metrics computed from a [`PositionTally`].
    pub fn is_positional(self) -> bool {
        matches!(
            self,
            MetricKind::NeutralPoints
                | MetricKind::BottomPoints
                | MetricKind::TopPoints
                | MetricKind::EscapePct
                | MetricKind::RidePct
                | MetricKind::TurnPct
        )
    }

    pub fn from_tally(self, ruleset: Ruleset, tally: &PositionTally) -> Option<f64> {
        match self {
            MetricKind::NeutralPoints => Some(tally.neutral_points()),
            MetricKind::BottomPoints => tally.bottom_points(ruleset),
            MetricKind::TopPoints => tally.top_points(ruleset),
            MetricKind::EscapePct => tally.escape_pct(),
            MetricKind::RidePct => tally.ride_pct(),
            MetricKind::TurnPct => tally.turn_pct(),
            _ => None,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let t = raw.trim();
        MetricKind::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(t))
            .ok_or_else(|| format!("unknown metric {raw:?}"))
    }
}

/// Value of one metric over a collection of bouts. `None` means there was no
/// opportunity (or no bouts for a mean), which is not the same as zero.
///
/// Only bouts scored under `ruleset` count; near-fall weights differ between rulesets.
pub fn metric_value<'a, I>(kind: MetricKind, ruleset: Ruleset, bouts: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Bout>,
{
    let mut foreign = 0usize;
    let bouts: Vec<&Bout> = bouts
        .into_iter()
        .filter(|b| {
            let same = b.ruleset() == ruleset;
            foreign += usize::from(!same);
            same
        })
        .collect();
    if foreign > 0 {
        tracing::debug!(metric = kind.key(), %ruleset, foreign, "ignoring bouts from another ruleset");
    }
    if kind == MetricKind::Matches {
        return Some(bouts.len() as f64);
    }
    if kind.is_positional() {
        let tally: PositionTally = bouts.iter().copied().sum();
        return kind.from_tally(ruleset, &tally);
    }
    match kind {
        MetricKind::NumericResult => mean(bouts.iter().map(|b| b.numeric_result())),
        MetricKind::WinRate => mean(bouts.iter().map(|b| flag(b.is_win()))).map(|v| v * 100.0),
        MetricKind::BonusRate => mean(bouts.iter().map(|b| flag(b.bonus()))).map(|v| v * 100.0),
        MetricKind::PinRate => mean(bouts.iter().map(|b| flag(b.pin()))).map(|v| v * 100.0),
        MetricKind::MarginOfVictory => mean(bouts.iter().map(|b| b.margin_of_victory() as f64)),
        MetricKind::TakedownDiff => mean(bouts.iter().map(|b| b.takedown_differential() as f64)),
        _ => None,
    }
}

pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { None } else { Some(sum / n as f64) }
}

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bottom_points_example() {
        let tally = PositionTally {
            focus_escapes: 3,
            focus_reversals: 1,
            opp_near2: 0,
            opp_near_high: 1,
            opp_takedowns: 2,
            opp_reversals: 1,
            focus_bottom_choices: 1,
            opp_top_choices: 1,
            ..PositionTally::default()
        };
        let v = tally.bottom_points(Ruleset::College).unwrap();
        assert!((v - 1.8).abs() < 1e-12);
        // High school weighs the high near-fall at 3.
        let v = tally.bottom_points(Ruleset::HighSchool).unwrap();
        assert!((v - 1.6).abs() < 1e-12);
    }

    #[test]
    fn zero_opportunity_is_none_not_zero() {
        let tally = PositionTally::default();
        assert_eq!(tally.bottom_points(Ruleset::College), None);
        assert_eq!(tally.top_points(Ruleset::College), None);
        assert_eq!(tally.escape_pct(), None);
        assert_eq!(tally.turn_pct(), None);
        assert_eq!(tally.ride_pct(), None);
        assert_eq!(tally.neutral_points(), 0.0);
    }

    #[test]
    fn metric_keys_round_trip() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.key().parse::<MetricKind>(), Ok(kind));
        }
    }
}
