use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ruleset {
    College,
    HighSchool,
}

impl Ruleset {
    /// Closed label set for this ruleset, in upstream column order.
    pub fn labels(self) -> &'static [Label] {
        match self {
            Ruleset::College => COLLEGE_LABELS,
            Ruleset::HighSchool => HIGH_SCHOOL_LABELS,
        }
    }

    /// Regulation length in seconds (three periods).
    pub fn regulation_seconds(self) -> u32 {
        match self {
            Ruleset::College => 420,
            Ruleset::HighSchool => 360,
        }
    }

    /// Upper bound (inclusive) of periods one through three, in seconds.
    fn period_bounds(self) -> [u32; 3] {
        match self {
            Ruleset::College => [180, 300, 420],
            Ruleset::HighSchool => [120, 240, 360],
        }
    }

    /// Period derived from elapsed seconds; anything past regulation is overtime (4).
    pub fn period_for(self, seconds: u32) -> u8 {
        let [first, second, third] = self.period_bounds();
        if seconds <= first {
            1
        } else if seconds <= second {
            2
        } else if seconds <= third {
            3
        } else {
            4
        }
    }

    /// The high near-fall label: N4 in college, N3 in high school.
    pub fn high_near_fall(self) -> Label {
        match self {
            Ruleset::College => Label::NearFall4,
            Ruleset::HighSchool => Label::NearFall3,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Ruleset::College => "college",
            Ruleset::HighSchool => "high_school",
        }
    }
}

impl fmt::Display for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ruleset::College => f.write_str("college"),
            Ruleset::HighSchool => f.write_str("high school"),
        }
    }
}

impl FromStr for Ruleset {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let s = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match s.as_str() {
            "college" | "ncaa" => Ok(Ruleset::College),
            "high_school" | "highschool" | "hs" => Ok(Ruleset::HighSchool),
            _ => Err(format!("unknown ruleset {raw:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Scoring,
    Penalty,
    Choice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Takedown,
    Escape,
    Reversal,
    NearFall2,
    NearFall3,
    NearFall4,
    Caution,
    Penalty1,
    Penalty2,
    StallWarning,
    Stall1,
    Stall2,
    RidingTime,
    ChooseBottom,
    ChooseTop,
    ChooseNeutral,
    Defer,
}

const COLLEGE_LABELS: &[Label] = &[
    Label::Takedown,
    Label::Escape,
    Label::Reversal,
    Label::NearFall2,
    Label::NearFall4,
    Label::Caution,
    Label::Penalty1,
    Label::Penalty2,
    Label::StallWarning,
    Label::Stall1,
    Label::Stall2,
    Label::RidingTime,
    Label::ChooseBottom,
    Label::ChooseTop,
    Label::ChooseNeutral,
    Label::Defer,
];

const HIGH_SCHOOL_LABELS: &[Label] = &[
    Label::Takedown,
    Label::Escape,
    Label::Reversal,
    Label::NearFall2,
    Label::NearFall3,
    Label::Caution,
    Label::Penalty1,
    Label::Penalty2,
    Label::StallWarning,
    Label::Stall1,
    Label::Stall2,
    Label::ChooseBottom,
    Label::ChooseTop,
    Label::ChooseNeutral,
    Label::Defer,
];

impl Label {
    /// Resolve an upstream token against the ruleset's closed set.
    pub fn from_token(ruleset: Ruleset, token: &str) -> Result<Label> {
        let t = token.trim();
        ruleset
            .labels()
            .iter()
            .copied()
            .find(|label| label.token().eq_ignore_ascii_case(t))
            .ok_or_else(|| Error::UnknownLabel {
                ruleset,
                token: t.to_string(),
            })
    }

    pub fn token(self) -> &'static str {
        match self {
            Label::Takedown => "T2",
            Label::Escape => "E1",
            Label::Reversal => "R2",
            Label::NearFall2 => "N2",
            Label::NearFall3 => "N3",
            Label::NearFall4 => "N4",
            Label::Caution => "C",
            Label::Penalty1 => "P1",
            Label::Penalty2 => "P2",
            Label::StallWarning => "WS",
            Label::Stall1 => "S1",
            Label::Stall2 => "S2",
            Label::RidingTime => "RO1",
            Label::ChooseBottom => "BOT",
            Label::ChooseTop => "TOP",
            Label::ChooseNeutral => "NEU",
            Label::Defer => "DEFER",
        }
    }

    pub fn points(self) -> u32 {
        match self {
            Label::Takedown | Label::Reversal | Label::NearFall2 => 2,
            Label::NearFall3 => 3,
            Label::NearFall4 => 4,
            Label::Escape | Label::Penalty1 | Label::Stall1 | Label::RidingTime => 1,
            Label::Penalty2 | Label::Stall2 => 2,
            Label::Caution | Label::StallWarning => 0,
            Label::ChooseBottom | Label::ChooseTop | Label::ChooseNeutral | Label::Defer => 0,
        }
    }

    pub fn category(self) -> Category {
        match self {
            Label::Takedown
            | Label::Escape
            | Label::Reversal
            | Label::NearFall2
            | Label::NearFall3
            | Label::NearFall4 => Category::Scoring,
            Label::Caution
            | Label::Penalty1
            | Label::Penalty2
            | Label::StallWarning
            | Label::Stall1
            | Label::Stall2
            | Label::RidingTime => Category::Penalty,
            Label::ChooseBottom | Label::ChooseTop | Label::ChooseNeutral | Label::Defer => {
                Category::Choice
            }
        }
    }

    pub fn is_near_fall(self) -> bool {
        matches!(self, Label::NearFall2 | Label::NearFall3 | Label::NearFall4)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
