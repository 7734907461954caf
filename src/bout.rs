use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::event::{EventKind, ScoringEvent, Side};
use crate::labels::{Label, Ruleset};
use crate::outcome::{Method, ResultInfo};
use crate::validator::{Position, validate_sequence};

/// Wrestler identity as carried by the upstream `#`-wrapped strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Identity {
    pub name: String,
    pub team: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
        }
    }

    /// `4411#Roe, Sam#Home U (PA)#` -> name `Roe, Sam`, team `Home U`.
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw
            .split('#')
            .skip(1)
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let Some(name) = segments.next() else {
            return Self::new(raw.trim(), "");
        };
        let name = match name.split_once(',') {
            Some((last, first)) => format!("{}, {}", last.trim(), first.trim())
                .trim_end()
                .to_string(),
            None => name.to_string(),
        };
        let team = segments
            .next()
            .map(|t| t.split('(').next().unwrap_or(t).trim().to_string())
            .unwrap_or_default();
        Self { name, team }
    }
}

/// Per-side label occurrence counts for one bout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub focus: BTreeMap<Label, u32>,
    pub opponent: BTreeMap<Label, u32>,
}

impl LabelCounts {
    pub fn from_events(events: &[ScoringEvent]) -> Self {
        let mut out = Self::default();
        for ev in events {
            if let EventKind::Scored { side, label } = ev.kind {
                *out.side_mut(side).entry(label).or_insert(0) += 1;
            }
        }
        out
    }

    pub fn get(&self, side: Side, label: Label) -> u32 {
        self.side(side).get(&label).copied().unwrap_or(0)
    }

    pub fn points(&self, side: Side) -> u32 {
        self.side(side)
            .iter()
            .map(|(label, n)| label.points() * n)
            .sum()
    }

    fn side(&self, side: Side) -> &BTreeMap<Label, u32> {
        match side {
            Side::Focus => &self.focus,
            Side::Opponent => &self.opponent,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Label, u32> {
        match side {
            Side::Focus => &mut self.focus,
            Side::Opponent => &mut self.opponent,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoutInput {
    pub id: String,
    pub event_id: Option<String>,
    pub ruleset: Ruleset,
    pub date: NaiveDate,
    pub weight_class: String,
    pub focus: Identity,
    pub opponent: Identity,
    pub events: Vec<ScoringEvent>,
    pub result: ResultInfo,
    pub team_points: i32,
}

/// Running score after one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScorePoint {
    pub seconds: u32,
    pub period: u8,
    pub label: String,
    pub focus_score: u32,
    pub opponent_score: u32,
}

/// A validated match. Only obtainable through [`Bout::build`], and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Bout {
    id: String,
    event_id: Option<String>,
    ruleset: Ruleset,
    date: NaiveDate,
    weight_class: String,
    focus: Identity,
    opponent: Identity,
    events: Vec<ScoringEvent>,
    result: ResultInfo,
    duration_seconds: u32,
    team_points: i32,
    numeric_result: f64,
    counts: LabelCounts,
    focus_points: u32,
    opponent_points: u32,
    final_position: Position,
}

impl Bout {
    pub fn build(input: BoutInput) -> Result<Bout> {
        input.result.check_consistent()?;
        let numeric_result = input.result.numeric_result()?;
        let final_position = validate_sequence(input.ruleset, &input.events)?;

        let counts = LabelCounts::from_events(&input.events);
        let focus_points = counts.points(Side::Focus);
        let opponent_points = counts.points(Side::Opponent);
        let duration_seconds = duration_for(input.ruleset, input.result.method, &input.events);
        let team_points = if input.result.is_win() {
            input.team_points
        } else {
            0
        };

        Ok(Bout {
            id: input.id,
            event_id: input.event_id,
            ruleset: input.ruleset,
            date: input.date,
            weight_class: input.weight_class,
            focus: input.focus,
            opponent: input.opponent,
            events: input.events,
            result: input.result,
            duration_seconds,
            team_points,
            numeric_result,
            counts,
            focus_points,
            opponent_points,
            final_position,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }

    pub fn ruleset(&self) -> Ruleset {
        self.ruleset
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weight_class(&self) -> &str {
        &self.weight_class
    }

    pub fn focus(&self) -> &Identity {
        &self.focus
    }

    pub fn opponent(&self) -> &Identity {
        &self.opponent
    }

    pub fn events(&self) -> &[ScoringEvent] {
        &self.events
    }

    pub fn result(&self) -> ResultInfo {
        self.result
    }

    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    pub fn team_points(&self) -> i32 {
        self.team_points
    }

    pub fn numeric_result(&self) -> f64 {
        self.numeric_result
    }

    pub fn counts(&self) -> &LabelCounts {
        &self.counts
    }

    pub fn count(&self, side: Side, label: Label) -> u32 {
        self.counts.get(side, label)
    }

    pub fn focus_points(&self) -> u32 {
        self.focus_points
    }

    pub fn opponent_points(&self) -> u32 {
        self.opponent_points
    }

    pub fn margin_of_victory(&self) -> i32 {
        self.focus_points as i32 - self.opponent_points as i32
    }

    pub fn takedown_differential(&self) -> i32 {
        self.count(Side::Focus, Label::Takedown) as i32
            - self.count(Side::Opponent, Label::Takedown) as i32
    }

    pub fn is_win(&self) -> bool {
        self.result.is_win()
    }

    pub fn bonus(&self) -> bool {
        self.result.bonus()
    }

    pub fn pin(&self) -> bool {
        self.result.pin()
    }

    pub fn overtime(&self) -> bool {
        self.result.overtime
    }

    pub fn final_position(&self) -> Position {
        self.final_position
    }

    pub fn score_timeline(&self) -> Vec<ScorePoint> {
        let mut focus_score = 0;
        let mut opponent_score = 0;
        self.events
            .iter()
            .map(|ev| {
                if let EventKind::Scored { side, label } = ev.kind {
                    match side {
                        Side::Focus => focus_score += label.points(),
                        Side::Opponent => opponent_score += label.points(),
                    }
                }
                ScorePoint {
                    seconds: ev.seconds,
                    period: ev.period,
                    label: ev.formatted_label(),
                    focus_score,
                    opponent_score,
                }
            })
            .collect()
    }
}

/// Decisions run the full regulation clock (longer in overtime); stoppages end at the
/// last recorded action.
fn duration_for(ruleset: Ruleset, method: Method, events: &[ScoringEvent]) -> u32 {
    let last = events.last().map(|ev| ev.seconds).unwrap_or(0);
    match method {
        Method::Decision | Method::Major => last.max(ruleset.regulation_seconds()),
        Method::Tech
        | Method::Fall
        | Method::Disqualification
        | Method::Default
        | Method::Forfeit => last,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_parses_name_and_team() {
        let id = Identity::parse("4411#Roe,Sam#Home U (PA)#");
        assert_eq!(id.name, "Roe, Sam");
        assert_eq!(id.team, "Home U");

        assert_eq!(Identity::parse("#Doe,#Home U#").name, "Doe,");

        let id = Identity::parse("Unknown");
        assert_eq!(id.name, "Unknown");
        assert_eq!(id.team, "");
    }

    #[test]
    fn label_counts_sum_points_per_side() {
        let events = vec![
            ScoringEvent::start(),
            ScoringEvent::scored(Ruleset::College, 20, Side::Focus, Label::Takedown),
            ScoringEvent::scored(Ruleset::College, 40, Side::Focus, Label::NearFall4),
            ScoringEvent::scored(Ruleset::College, 90, Side::Opponent, Label::Stall1),
        ];
        let counts = LabelCounts::from_events(&events);
        assert_eq!(counts.points(Side::Focus), 6);
        assert_eq!(counts.points(Side::Opponent), 1);
        assert_eq!(counts.get(Side::Focus, Label::Takedown), 1);
        assert_eq!(counts.get(Side::Opponent, Label::Takedown), 0);
    }
}
