use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::bout::Bout;
use crate::event::Side;
use crate::labels::{Label, Ruleset};
use crate::metrics::{PositionTally, mean};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grouping {
    Wrestler,
    Team,
}

/// Roster directory record; only used to attach identity to aggregated rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    #[serde(default)]
    pub team: String,
}

/// Labels whose per-match focus-minus-opponent difference is reported.
const DIFF_LABELS: &[Label] = &[
    Label::Takedown,
    Label::Escape,
    Label::Reversal,
    Label::NearFall2,
    Label::NearFall3,
    Label::NearFall4,
    Label::StallWarning,
    Label::Stall1,
    Label::Caution,
    Label::Penalty1,
    Label::Penalty2,
    Label::RidingTime,
];

#[derive(Debug, Clone, Serialize)]
pub struct RosterRow {
    pub name: String,
    pub team: String,
    pub weight_classes: Vec<String>,
    pub matches: usize,
    pub wins: usize,
    pub losses: usize,

    // Per-match means.
    pub focus_points: f64,
    pub opp_points: f64,
    pub td_diff: f64,
    pub mov: f64,
    pub num_result: f64,
    pub duration_seconds: f64,
    pub duration: String,
    pub team_points: f64,
    pub win_pct: f64,
    pub bonus_pct: f64,
    pub pin_pct: f64,

    // Positional rates over the summed tally.
    pub neutral_points: Option<f64>,
    pub bottom_points: Option<f64>,
    pub top_points: Option<f64>,
    pub escape_pct: Option<f64>,
    pub ride_pct: Option<f64>,
    pub turn_pct: Option<f64>,

    pub label_diffs: BTreeMap<String, f64>,
}

/// One row per wrestler (or team), sorted by name. Empty groups never appear.
pub fn roster_rows(bouts: &[Bout], ruleset: Ruleset, grouping: Grouping) -> Vec<RosterRow> {
    let mut groups: BTreeMap<String, Vec<&Bout>> = BTreeMap::new();
    for bout in bouts {
        let key = match grouping {
            Grouping::Wrestler => bout.focus().name.clone(),
            Grouping::Team => bout.focus().team.clone(),
        };
        groups.entry(key).or_default().push(bout);
    }
    groups
        .into_iter()
        .filter_map(|(name, group)| {
            let team = match grouping {
                Grouping::Wrestler => group.first().map(|b| b.focus().team.clone())?,
                Grouping::Team => name.clone(),
            };
            summarize(name, team, ruleset, &group)
        })
        .collect()
}

/// Rows for directory members that have at least one bout; the directory's team wins.
pub fn roster_rows_for(directory: &[RosterEntry], bouts: &[Bout], ruleset: Ruleset) -> Vec<RosterRow> {
    directory
        .iter()
        .filter_map(|entry| {
            let group: Vec<&Bout> = bouts.iter().filter(|b| b.focus().name == entry.name).collect();
            if group.is_empty() {
                tracing::debug!(name = %entry.name, "roster entry has no bouts");
            }
            summarize(entry.name.clone(), entry.team.clone(), ruleset, &group)
        })
        .collect()
}

fn summarize(name: String, team: String, ruleset: Ruleset, group: &[&Bout]) -> Option<RosterRow> {
    if group.is_empty() {
        return None;
    }
    let n = group.len();
    let wins = group.iter().filter(|b| b.is_win()).count();
    let avg = |f: &dyn Fn(&Bout) -> f64| mean(group.iter().map(|b| f(*b))).unwrap_or_default();
    let pct = |f: &dyn Fn(&Bout) -> bool| share_pct(group.iter().filter(|b| f(**b)).count(), n);

    let weight_classes: BTreeSet<String> = group
        .iter()
        .map(|b| b.weight_class().to_string())
        .filter(|w| !w.is_empty())
        .collect();

    let tally: PositionTally = group.iter().copied().sum();
    let duration_seconds = avg(&|b| b.duration_seconds() as f64);

    let label_diffs = DIFF_LABELS
        .iter()
        .filter(|label| ruleset.labels().contains(label))
        .map(|label| {
            let diff = avg(&|b| {
                b.count(Side::Focus, *label) as f64 - b.count(Side::Opponent, *label) as f64
            });
            (label.token().to_string(), diff)
        })
        .collect();

    Some(RosterRow {
        name,
        team,
        weight_classes: weight_classes.into_iter().collect(),
        matches: n,
        wins,
        losses: n - wins,
        focus_points: avg(&|b| b.focus_points() as f64),
        opp_points: avg(&|b| b.opponent_points() as f64),
        td_diff: avg(&|b| b.takedown_differential() as f64),
        mov: avg(&|b| b.margin_of_victory() as f64),
        num_result: avg(&|b| b.numeric_result()),
        duration_seconds,
        duration: format_clock(duration_seconds),
        team_points: avg(&|b| b.team_points() as f64),
        win_pct: share_pct(wins, n),
        bonus_pct: pct(&|b| b.bonus()),
        pin_pct: pct(&|b| b.pin()),
        neutral_points: Some(tally.neutral_points()),
        bottom_points: tally.bottom_points(ruleset),
        top_points: tally.top_points(ruleset),
        escape_pct: tally.escape_pct(),
        ride_pct: tally.ride_pct(),
        turn_pct: tally.turn_pct(),
        label_diffs,
    })
}

fn share_pct(hits: usize, n: usize) -> f64 {
    hits as f64 / n as f64 * 100.0
}

fn format_clock(seconds: f64) -> String {
    let s = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", s / 60, s % 60)
}
