//! Seeded generator of legal bouts, for demos, benches and property tests.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::event::{Color, EventKind, ScoringEvent, Side};
use crate::ingest::RawMatch;
use crate::labels::{Category, Label, Ruleset};
use crate::validator::{Position, Step, legal_labels, step};

const TEAMS: &[&str] = &["Home U", "Valley State", "Ridge Tech", "North College"];
const WEIGHTS: &[&str] = &["125", "133", "141", "149", "157", "165", "174", "184", "197", "285"];

/// Random but legal event list: START, then `actions` scored events in clock order.
pub fn random_events<R: Rng>(rng: &mut R, ruleset: Ruleset, actions: usize) -> Vec<ScoringEvent> {
    let mut events = vec![ScoringEvent::start()];
    let mut position = Position::Neutral;
    let regulation = ruleset.regulation_seconds();
    let mut seconds = 0u32;

    for i in 0..actions {
        let remaining = (actions - i) as u32;
        let budget = regulation.saturating_sub(seconds) / remaining.max(1);
        seconds += rng.gen_range(0..=budget.max(1));
        seconds = seconds.min(regulation);

        let side = if rng.gen_bool(0.5) {
            Side::Focus
        } else {
            Side::Opponent
        };
        let label = pick_label(rng, ruleset, position, side);
        if let Step::Legal(next) = step(position, side, label) {
            position = next;
        }
        events.push(ScoringEvent::scored(ruleset, seconds, side, label));
    }
    events
}

/// Prefer scoring moves; penalties and choices are the minority, as on a real mat.
fn pick_label<R: Rng>(rng: &mut R, ruleset: Ruleset, position: Position, side: Side) -> Label {
    let legal = legal_labels(ruleset, position, side);
    let scoring: Vec<Label> = legal
        .iter()
        .copied()
        .filter(|l| l.category() == Category::Scoring)
        .collect();
    let pool = if !scoring.is_empty() && rng.gen_bool(0.8) {
        &scoring
    } else {
        &legal
    };
    // `legal` always holds the always-legal labels, so it is never empty.
    *pool.choose(rng).unwrap_or(&Label::Caution)
}

/// Render events back into the upstream `minute*second*period*label*color` log.
pub fn events_to_log(events: &[ScoringEvent], focus: Color) -> String {
    let opponent = match focus {
        Color::Red => Color::Green,
        Color::Green => Color::Red,
    };
    events
        .iter()
        .filter_map(|ev| match ev.kind {
            EventKind::Start => None,
            EventKind::Scored { side, label } => {
                let color = if side == Side::Focus { focus } else { opponent };
                let color = match color {
                    Color::Red => "Red",
                    Color::Green => "Green",
                };
                Some(format!(
                    "{}*{}*{}*{}*{}",
                    ev.seconds / 60,
                    ev.seconds % 60,
                    ev.period,
                    label.token(),
                    color
                ))
            }
        })
        .collect::<Vec<_>>()
        .join("#")
}

fn points(events: &[ScoringEvent], side: Side) -> u32 {
    events
        .iter()
        .filter(|ev| ev.side() == Some(side))
        .filter_map(|ev| ev.label())
        .map(Label::points)
        .sum()
}

pub fn random_raw_match<R: Rng>(
    rng: &mut R,
    ruleset: Ruleset,
    match_id: String,
    date: NaiveDate,
    focus_name: &str,
) -> RawMatch {
    let actions = rng.gen_range(2..14);
    let events = random_events(rng, ruleset, actions);
    let focus_pts = points(&events, Side::Focus);
    let opp_pts = points(&events, Side::Opponent);
    let margin = focus_pts.abs_diff(opp_pts);

    let winner = if focus_pts > opp_pts { 1 } else { 0 };
    let result = if margin >= 15 {
        format!("Tech Fall {focus_pts}-{opp_pts}")
    } else if margin >= 8 {
        format!("Maj {focus_pts}-{opp_pts}")
    } else if margin > 0 && rng.gen_bool(0.1) {
        "Fall 4:51".to_string()
    } else {
        format!("Dec {focus_pts}-{opp_pts}")
    };
    let team_points = match result.split_whitespace().next() {
        Some("Tech") => 5,
        Some("Maj") => 4,
        Some("Fall") => 6,
        _ => 3,
    };

    let focus_color = if rng.gen_bool(0.5) {
        Color::Green
    } else {
        Color::Red
    };
    let team = TEAMS[0];
    let opp_team = TEAMS[rng.gen_range(1..TEAMS.len())];
    let focus_str = format!("4411#{focus_name}#{team}#");
    let opp_str = format!("#Rival, {}#{opp_team}#", rng.gen_range(1..500));
    let (red_wrestler, green_wrestler) = match focus_color {
        Color::Green => (opp_str, focus_str),
        Color::Red => (focus_str, opp_str),
    };

    RawMatch {
        match_id,
        event_id: None,
        date,
        weight_class: WEIGHTS[rng.gen_range(0..WEIGHTS.len())].to_string(),
        scoring_events: events_to_log(&events, focus_color),
        winner,
        result,
        team_points,
        red_wrestler,
        green_wrestler,
    }
}

/// Deterministic season: `wrestlers` athletes, `bouts_each` bouts apiece, one bout
/// every few days from `start`.
pub fn synthetic_season(
    seed: u64,
    ruleset: Ruleset,
    start: NaiveDate,
    wrestlers: usize,
    bouts_each: usize,
) -> Vec<RawMatch> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(wrestlers * bouts_each);
    for w in 0..wrestlers {
        let name = format!("Athlete, No{w}");
        for b in 0..bouts_each {
            let date = start + Duration::days((b as i64) * 4);
            let id = format!("syn-{seed}-{w}-{b}");
            out.push(random_raw_match(&mut rng, ruleset, id, date, &name));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::validate_sequence;

    #[test]
    fn generated_events_validate() {
        let mut rng = StdRng::seed_from_u64(7);
        for ruleset in [Ruleset::College, Ruleset::HighSchool] {
            for _ in 0..50 {
                let events = random_events(&mut rng, ruleset, 12);
                assert!(validate_sequence(ruleset, &events).is_ok());
            }
        }
    }
}
