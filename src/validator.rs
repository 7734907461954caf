//! Position state machine over a bout's event list.
//!
//! Position is tracked from the focus wrestler's point of view. Every label is
//! either legal everywhere or legal only from one position; a label that is
//! legal may also move the bout into a new position.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::{EventKind, ScoringEvent, Side};
use crate::labels::{Label, Ruleset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Neutral,
    Top,
    Bottom,
}

/// Outcome of applying one scored label in a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Legal(Position),
    Illegal,
}

/// Exhaustive transition table. Near-fall variants are matched by kind; labels
/// outside the bout's ruleset are rejected by [`validate_sequence`] before this runs.
pub fn step(position: Position, side: Side, label: Label) -> Step {
    use Position::{Bottom, Neutral, Top};
    use Side::{Focus, Opponent};

    match label {
        Label::Caution
        | Label::Penalty1
        | Label::Penalty2
        | Label::StallWarning
        | Label::Stall1
        | Label::Stall2
        | Label::RidingTime
        | Label::Defer => Step::Legal(position),

        // Period choices reset the position whoever makes them.
        Label::ChooseTop => Step::Legal(match side {
            Focus => Top,
            Opponent => Bottom,
        }),
        Label::ChooseBottom => Step::Legal(match side {
            Focus => Bottom,
            Opponent => Top,
        }),
        Label::ChooseNeutral => Step::Legal(Neutral),

        Label::Takedown => match (position, side) {
            (Neutral, Focus) => Step::Legal(Top),
            (Neutral, Opponent) => Step::Legal(Bottom),
            (Top | Bottom, _) => Step::Illegal,
        },
        Label::Escape => match (position, side) {
            (Top, Opponent) | (Bottom, Focus) => Step::Legal(Neutral),
            _ => Step::Illegal,
        },
        Label::Reversal => match (position, side) {
            (Top, Opponent) => Step::Legal(Bottom),
            (Bottom, Focus) => Step::Legal(Top),
            _ => Step::Illegal,
        },
        Label::NearFall2 | Label::NearFall3 | Label::NearFall4 => match (position, side) {
            (Top, Focus) | (Bottom, Opponent) => Step::Legal(position),
            _ => Step::Illegal,
        },
    }
}

/// Check ordering, ruleset membership and position legality, returning the
/// position after the last event.
pub fn validate_sequence(ruleset: Ruleset, events: &[ScoringEvent]) -> Result<Position> {
    let Some(first) = events.first() else {
        return Err(Error::IllegalTransition {
            index: 0,
            label: "<empty>".to_string(),
            position: Position::Neutral,
        });
    };
    if !first.is_start() || first.seconds != 0 {
        return Err(Error::IllegalTransition {
            index: 0,
            label: first.formatted_label(),
            position: Position::Neutral,
        });
    }

    let mut position = Position::Neutral;
    let mut previous = first.seconds;
    for (index, event) in events.iter().enumerate().skip(1) {
        if event.seconds < previous {
            return Err(Error::SequenceOrder {
                index,
                seconds: event.seconds,
                previous,
            });
        }
        let next = match event.kind {
            EventKind::Start => Step::Illegal,
            EventKind::Scored { label, .. } if !ruleset.labels().contains(&label) => {
                return Err(Error::UnknownLabel {
                    ruleset,
                    token: label.token().to_string(),
                });
            }
            EventKind::Scored { side, label } => step(position, side, label),
        };
        match next {
            Step::Legal(p) => position = p,
            Step::Illegal => {
                return Err(Error::IllegalTransition {
                    index,
                    label: event.formatted_label(),
                    position,
                });
            }
        }
        previous = event.seconds;
    }
    Ok(position)
}

/// Labels a side may legally score from `position`.
pub fn legal_labels(ruleset: Ruleset, position: Position, side: Side) -> Vec<Label> {
    ruleset
        .labels()
        .iter()
        .copied()
        .filter(|label| matches!(step(position, side, *label), Step::Legal(_)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(seconds: u32, side: Side, label: Label) -> ScoringEvent {
        ScoringEvent::scored(Ruleset::College, seconds, side, label)
    }

    #[test]
    fn takedown_escape_takedown_is_accepted() {
        let events = vec![
            ScoringEvent::start(),
            ev(30, Side::Focus, Label::Takedown),
            ev(75, Side::Opponent, Label::Escape),
            ev(120, Side::Opponent, Label::Takedown),
        ];
        assert_eq!(validate_sequence(Ruleset::College, &events).unwrap(), Position::Bottom);
    }

    #[test]
    fn double_takedown_is_rejected() {
        let events = vec![
            ScoringEvent::start(),
            ev(30, Side::Focus, Label::Takedown),
            ev(40, Side::Focus, Label::Takedown),
        ];
        let err = validate_sequence(Ruleset::College, &events).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalTransition {
                index: 2,
                position: Position::Top,
                ..
            }
        ));
    }

    #[test]
    fn neutral_legal_set_is_takedowns_plus_always_legal() {
        let focus = legal_labels(Ruleset::HighSchool, Position::Neutral, Side::Focus);
        assert!(focus.contains(&Label::Takedown));
        assert!(!focus.contains(&Label::Escape));
        assert!(!focus.contains(&Label::NearFall3));
        assert!(focus.contains(&Label::Stall1));
        assert!(focus.contains(&Label::ChooseTop));
    }

    #[test]
    fn labels_outside_the_ruleset_are_rejected() {
        let events = vec![
            ScoringEvent::start(),
            ScoringEvent::scored(Ruleset::HighSchool, 30, Side::Focus, Label::Takedown),
            ScoringEvent::scored(Ruleset::HighSchool, 60, Side::Focus, Label::NearFall4),
        ];
        assert!(matches!(
            validate_sequence(Ruleset::HighSchool, &events),
            Err(Error::UnknownLabel { ruleset: Ruleset::HighSchool, .. })
        ));
        assert_eq!(
            validate_sequence(Ruleset::College, &events).unwrap(),
            Position::Top
        );
    }
}
