use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::labels::{Label, Ruleset};

/// Upstream storage glitch: two forfeit markers fused into one token. Not an event.
pub const LEGACY_FORFEIT_ARTIFACT: &str = "0*0*0*Forfeit*Red0*0*0*Forfeit*Red";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Focus,
    Opponent,
}

impl Side {
    pub fn prefix(self) -> char {
        match self {
            Side::Focus => 'f',
            Side::Opponent => 'o',
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::Focus => Side::Opponent,
            Side::Opponent => Side::Focus,
        }
    }
}

/// Mat color; the upstream log attributes each action by color, not by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
}

impl FromStr for Color {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            other => Err(format!("unknown color {other:?}")),
        }
    }
}

/// The tracked team's wrestler is the one whose upstream string carries the numeric id prefix.
pub fn focus_color_from_wrestlers(_red: &str, green: &str) -> Color {
    if green.trim_start().starts_with(|c: char| c.is_ascii_digit()) {
        Color::Green
    } else {
        Color::Red
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Start,
    Scored { side: Side, label: Label },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringEvent {
    pub seconds: u32,
    pub period: u8,
    pub kind: EventKind,
}

impl ScoringEvent {
    pub fn start() -> Self {
        Self {
            seconds: 0,
            period: 1,
            kind: EventKind::Start,
        }
    }

    pub fn scored(ruleset: Ruleset, seconds: u32, side: Side, label: Label) -> Self {
        Self {
            seconds,
            period: ruleset.period_for(seconds),
            kind: EventKind::Scored { side, label },
        }
    }

    /// Build from a raw upstream action. The period hint is ignored; the period is
    /// re-derived from the clock.
    pub fn from_raw(ruleset: Ruleset, focus: Color, raw: &RawAction) -> Result<Self> {
        let owner: Color = raw
            .owner
            .parse()
            .map_err(|msg: String| Error::parse(&raw.owner, msg))?;
        let side = if owner == focus {
            Side::Focus
        } else {
            Side::Opponent
        };
        let label = Label::from_token(ruleset, &raw.label)?;
        let seconds = raw.seconds().ok_or_else(|| {
            Error::parse(&format!("{}*{}", raw.minute, raw.second), "clock out of range")
        })?;
        Ok(Self::scored(ruleset, seconds, side, label))
    }

    pub fn side(&self) -> Option<Side> {
        match self.kind {
            EventKind::Start => None,
            EventKind::Scored { side, .. } => Some(side),
        }
    }

    pub fn label(&self) -> Option<Label> {
        match self.kind {
            EventKind::Start => None,
            EventKind::Scored { label, .. } => Some(label),
        }
    }

    pub fn is_start(&self) -> bool {
        matches!(self.kind, EventKind::Start)
    }

    /// `fT2`, `oE1`, or `START`.
    pub fn formatted_label(&self) -> String {
        match self.kind {
            EventKind::Start => "START".to_string(),
            EventKind::Scored { side, label } => format!("{}{}", side.prefix(), label.token()),
        }
    }

    /// `MM:SS`.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.seconds / 60, self.seconds % 60)
    }
}

impl fmt::Display for ScoringEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.clock(), self.formatted_label())
    }
}

/// One `minute*second*period*label*owner` token, split but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAction {
    pub minute: u32,
    pub second: u32,
    pub period_hint: Option<u8>,
    pub label: String,
    pub owner: String,
}

impl RawAction {
    pub fn parse(token: &str) -> Result<Self> {
        let fields: Vec<&str> = token.split('*').collect();
        if fields.len() != 5 {
            return Err(Error::parse(
                token,
                format!("expected 5 fields, found {}", fields.len()),
            ));
        }
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::parse(token, "empty field"));
        }
        let minute = fields[0]
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::parse(token, "minute is not numeric"))?;
        let second = fields[1]
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::parse(token, "second is not numeric"))?;
        let action = Self {
            minute,
            second,
            period_hint: fields[2].trim().parse::<u8>().ok(),
            label: fields[3].trim().to_string(),
            owner: fields[4].trim().to_string(),
        };
        if action.seconds().is_none() {
            return Err(Error::parse(token, "clock out of range"));
        }
        Ok(action)
    }

    /// Elapsed seconds, or `None` when the clock does not fit in a `u32`.
    pub fn seconds(&self) -> Option<u32> {
        self.minute.checked_mul(60)?.checked_add(self.second)
    }
}

/// Parse a `#`-delimited upstream log into events, leading with the synthetic START.
///
/// Any malformed token fails the whole log; the caller discards the match.
pub fn parse_scoring_log(ruleset: Ruleset, focus: Color, log: &str) -> Result<Vec<ScoringEvent>> {
    let mut events = vec![ScoringEvent::start()];
    let log = log.trim();
    if log.is_empty() {
        return Ok(events);
    }
    let tokens: Vec<&str> = log.split('#').collect();
    let last = tokens.len() - 1;
    for (idx, token) in tokens.into_iter().enumerate() {
        if token == LEGACY_FORFEIT_ARTIFACT {
            continue;
        }
        // A terminal `#` leaves one empty tail token.
        if idx == last && idx > 0 && token.is_empty() {
            continue;
        }
        let raw = RawAction::parse(token)?;
        events.push(ScoringEvent::from_raw(ruleset, focus, &raw)?);
    }
    Ok(events)
}
