use mat_metrics::Error;
use mat_metrics::event::{Color, LEGACY_FORFEIT_ARTIFACT, ScoringEvent, Side, parse_scoring_log};
use mat_metrics::labels::{Label, Ruleset};
use mat_metrics::validator::{Position, legal_labels, validate_sequence};

fn ev(seconds: u32, side: Side, label: Label) -> ScoringEvent {
    ScoringEvent::scored(Ruleset::College, seconds, side, label)
}

#[test]
fn takedown_escape_takedown_ends_on_bottom() {
    let events = vec![
        ScoringEvent::start(),
        ev(30, Side::Focus, Label::Takedown),
        ev(60, Side::Opponent, Label::Escape),
        ev(90, Side::Opponent, Label::Takedown),
    ];
    assert_eq!(validate_sequence(Ruleset::College, &events).unwrap(), Position::Bottom);
}

#[test]
fn second_takedown_from_top_is_rejected() {
    let events = vec![
        ScoringEvent::start(),
        ev(30, Side::Focus, Label::Takedown),
        ev(45, Side::Focus, Label::Takedown),
    ];
    match validate_sequence(Ruleset::College, &events) {
        Err(Error::IllegalTransition {
            index, position, ..
        }) => {
            assert_eq!(index, 2);
            assert_eq!(position, Position::Top);
        }
        other => panic!("expected illegal transition, got {other:?}"),
    }
}

#[test]
fn swapped_timestamps_fail_ordering() {
    let events = vec![
        ScoringEvent::start(),
        ev(90, Side::Focus, Label::Takedown),
        ev(60, Side::Opponent, Label::Escape),
    ];
    assert!(matches!(
        validate_sequence(Ruleset::College, &events),
        Err(Error::SequenceOrder {
            index: 2,
            seconds: 60,
            previous: 90
        })
    ));
}

#[test]
fn sequence_must_open_with_start() {
    let events = vec![ev(10, Side::Focus, Label::Takedown)];
    assert!(matches!(
        validate_sequence(Ruleset::College, &events),
        Err(Error::IllegalTransition { index: 0, .. })
    ));
    assert!(validate_sequence(Ruleset::College, &[]).is_err());
    assert_eq!(
        validate_sequence(Ruleset::College, &[ScoringEvent::start()]).unwrap(),
        Position::Neutral
    );
}

#[test]
fn choices_set_position_and_penalties_keep_it() {
    let events = vec![
        ScoringEvent::start(),
        ev(180, Side::Opponent, Label::Defer),
        ev(180, Side::Focus, Label::ChooseBottom),
        ev(200, Side::Opponent, Label::Stall1),
        ev(210, Side::Opponent, Label::NearFall2),
        ev(240, Side::Focus, Label::Reversal),
        ev(260, Side::Focus, Label::NearFall4),
        ev(300, Side::Opponent, Label::ChooseNeutral),
    ];
    assert_eq!(validate_sequence(Ruleset::College, &events).unwrap(), Position::Neutral);
}

#[test]
fn near_falls_only_from_control() {
    let neutral = legal_labels(Ruleset::College, Position::Neutral, Side::Focus);
    assert!(neutral.contains(&Label::Takedown));
    assert!(!neutral.contains(&Label::NearFall2));
    assert!(!neutral.contains(&Label::Escape));

    let top = legal_labels(Ruleset::College, Position::Top, Side::Focus);
    assert!(top.contains(&Label::NearFall4));
    assert!(!top.contains(&Label::Takedown));
    assert!(top.contains(&Label::RidingTime));

    let hs_top = legal_labels(Ruleset::HighSchool, Position::Top, Side::Focus);
    assert!(hs_top.contains(&Label::NearFall3));
    assert!(!hs_top.contains(&Label::NearFall4));
    assert!(!hs_top.contains(&Label::RidingTime));
}

#[test]
fn log_parsing_resolves_sides_and_periods() {
    let log = format!("{LEGACY_FORFEIT_ARTIFACT}#2*59*1*T2*Red#3*01*2*N4*Red#7*30*3*E1*Green#");
    let events = parse_scoring_log(Ruleset::College, Color::Red, &log).unwrap();
    assert_eq!(events.len(), 4);
    assert!(events[0].is_start());
    assert_eq!(events[1].period, 1);
    assert_eq!(events[2].period, 2);
    assert_eq!(events[3].period, 4);
    assert_eq!(events[3].formatted_label(), "oE1");
    assert_eq!(events[3].clock(), "07:30");
}

#[test]
fn high_school_periods_are_shorter() {
    let events = parse_scoring_log(Ruleset::HighSchool, Color::Green, "2*10*1*T2*Green#4*30*3*N3*Green").unwrap();
    assert_eq!(events[1].period, 2);
    assert_eq!(events[2].period, 3);
}

#[test]
fn malformed_tokens_fail_the_whole_log() {
    for log in [
        "1*00*1*T2*Green#****",
        "1*00*1*T2",
        "x*00*1*T2*Green",
        "1*00*1**Green",
    ] {
        assert!(
            matches!(
                parse_scoring_log(Ruleset::College, Color::Green, log),
                Err(Error::Parse { .. })
            ),
            "{log} should not parse"
        );
    }
    assert!(matches!(
        parse_scoring_log(Ruleset::HighSchool, Color::Green, "1*00*1*N4*Green"),
        Err(Error::UnknownLabel { .. })
    ));
    assert_eq!(
        parse_scoring_log(Ruleset::College, Color::Green, "  ").unwrap().len(),
        1
    );
}
