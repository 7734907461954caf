use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    Decision,
    Major,
    Tech,
    Fall,
    Default,
    Disqualification,
    Forfeit,
}

impl Method {
    /// Prefix match against the upstream free-text result (`Dec 5-2`, `Fall 3:12`, ...).
    pub fn from_result_text(text: &str) -> Result<Method> {
        let t = text.trim();
        let method = if t.starts_with("Dec") {
            Method::Decision
        } else if t.starts_with("Maj") {
            Method::Major
        } else if t.starts_with("Tech") {
            Method::Tech
        } else if t.starts_with("Fall") {
            Method::Fall
        } else if t.starts_with("Dis") {
            Method::Disqualification
        } else if t.starts_with("Def") {
            Method::Default
        } else if t.starts_with("For") || t.starts_with("Double") {
            Method::Forfeit
        } else {
            return Err(Error::UnknownResult(t.to_string()));
        };
        Ok(method)
    }

    pub fn name(self) -> &'static str {
        match self {
            Method::Decision => "Decision",
            Method::Major => "Major",
            Method::Tech => "Tech",
            Method::Fall => "Fall",
            Method::Default => "Default",
            Method::Disqualification => "Disqualification",
            Method::Forfeit => "Forfeit",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultInfo {
    pub outcome: Outcome,
    pub method: Method,
    pub overtime: bool,
}

impl ResultInfo {
    pub fn text(&self) -> String {
        let base = match self.outcome {
            Outcome::Win => "Win",
            Outcome::Loss => "Loss",
        };
        format!("{base}-{}", self.method)
    }

    pub fn is_win(&self) -> bool {
        self.outcome == Outcome::Win
    }

    pub fn bonus(&self) -> bool {
        self.is_win() && matches!(self.method, Method::Major | Method::Tech | Method::Fall)
    }

    pub fn pin(&self) -> bool {
        self.is_win() && self.method == Method::Fall
    }

    /// Fixed result scale: wins in 1.20..=1.80, losses in 0.20..=0.80.
    /// Defaults and forfeits have no place on the scale and are rejected.
    pub fn numeric_result(&self) -> Result<f64> {
        match (self.outcome, self.method) {
            (Outcome::Win, Method::Decision | Method::Disqualification) => Ok(1.20),
            (Outcome::Win, Method::Major) => Ok(1.40),
            (Outcome::Win, Method::Tech) => Ok(1.60),
            (Outcome::Win, Method::Fall) => Ok(1.80),
            (Outcome::Loss, Method::Decision) => Ok(0.80),
            (Outcome::Loss, Method::Major) => Ok(0.60),
            (Outcome::Loss, Method::Tech) => Ok(0.40),
            (Outcome::Loss, Method::Fall | Method::Disqualification) => Ok(0.20),
            (_, Method::Default | Method::Forfeit) => Err(Error::UnknownResult(self.text())),
        }
    }

    pub fn check_consistent(&self) -> Result<()> {
        if self.overtime && matches!(self.method, Method::Tech | Method::Fall) {
            return Err(Error::ResultConflict(format!(
                "{} cannot go to overtime",
                self.method
            )));
        }
        Ok(())
    }
}

/// Upstream contract: `winner == 1` is a focus win; a parenthetical marks overtime.
pub fn parse_result(winner: i32, result_text: &str) -> Result<ResultInfo> {
    let method = Method::from_result_text(result_text)?;
    Ok(ResultInfo {
        outcome: if winner == 1 { Outcome::Win } else { Outcome::Loss },
        method,
        overtime: result_text.contains('('),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_text_prefixes() {
        let r = parse_result(1, "Dec 5-3 (SV-1)").unwrap();
        assert_eq!(r.method, Method::Decision);
        assert!(r.overtime);
        assert_eq!(r.numeric_result().unwrap(), 1.20);

        let r = parse_result(0, "Fall 2:45").unwrap();
        assert_eq!(r.outcome, Outcome::Loss);
        assert_eq!(r.numeric_result().unwrap(), 0.20);
        assert!(!r.bonus());

        assert_eq!(
            parse_result(1, "Double Forfeit").unwrap().method,
            Method::Forfeit
        );
        assert!(parse_result(1, "Injury").is_err());
    }

    #[test]
    fn forfeits_have_no_numeric_result() {
        let r = parse_result(1, "For.").unwrap();
        assert!(matches!(r.numeric_result(), Err(Error::UnknownResult(_))));
    }

    #[test]
    fn fall_in_overtime_is_a_conflict() {
        let r = parse_result(1, "Fall (TB-1) 8:02").unwrap();
        assert!(matches!(r.check_consistent(), Err(Error::ResultConflict(_))));
    }
}
