use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Deserializer, Serialize};

use crate::bout::{Bout, BoutInput, Identity};
use crate::error::{Error, Result};
use crate::event::{Color, focus_color_from_wrestlers, parse_scoring_log};
use crate::labels::Ruleset;
use crate::outcome::parse_result;

/// Practice/scout entries upstream uses as stand-ins for real athletes.
const PLACEHOLDER_NAMES: &[&str] = &["Wrestler, Scout", "Doe, John", "Doe,", "Wrestler, Our"];

/// One match as exported by the upstream scoring service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMatch {
    #[serde(rename = "matchID")]
    pub match_id: String,
    #[serde(rename = "eventID", default)]
    pub event_id: Option<String>,
    #[serde(rename = "theDate", deserialize_with = "lenient_date")]
    pub date: NaiveDate,
    #[serde(rename = "theWeightClass", default, deserialize_with = "lenient_string")]
    pub weight_class: String,
    #[serde(rename = "scoringEvents", default, deserialize_with = "null_as_empty")]
    pub scoring_events: String,
    #[serde(deserialize_with = "lenient_int")]
    pub winner: i32,
    #[serde(rename = "theResult")]
    pub result: String,
    #[serde(rename = "teamPoints", default, deserialize_with = "lenient_int")]
    pub team_points: i32,
    #[serde(rename = "redWrestler")]
    pub red_wrestler: String,
    #[serde(rename = "greenWrestler")]
    pub green_wrestler: String,
}

impl RawMatch {
    pub fn focus_color(&self) -> Color {
        focus_color_from_wrestlers(&self.red_wrestler, &self.green_wrestler)
    }

    /// Focus and opponent identity, in that order.
    pub fn identities(&self) -> (Identity, Identity) {
        let red = Identity::parse(&self.red_wrestler);
        let green = Identity::parse(&self.green_wrestler);
        match self.focus_color() {
            Color::Green => (green, red),
            Color::Red => (red, green),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        let (focus, opponent) = self.identities();
        PLACEHOLDER_NAMES.contains(&focus.name.as_str())
            || PLACEHOLDER_NAMES.contains(&opponent.name.as_str())
    }

    pub fn to_input(&self, ruleset: Ruleset) -> Result<BoutInput> {
        let (focus, opponent) = self.identities();
        let events = parse_scoring_log(ruleset, self.focus_color(), &self.scoring_events)?;
        let result = parse_result(self.winner, &self.result)?;
        Ok(BoutInput {
            id: self.match_id.clone(),
            event_id: self.event_id.clone(),
            ruleset,
            date: self.date,
            weight_class: self.weight_class.clone(),
            focus,
            opponent,
            events,
            result,
            team_points: self.team_points,
        })
    }

    pub fn build(&self, ruleset: Ruleset) -> Result<Bout> {
        Bout::build(self.to_input(ruleset)?)
    }
}

/// A decoded match dump. Records that do not deserialize are kept aside as skips
/// so the readable ones still get ingested.
#[derive(Debug, Clone, Default)]
pub struct RawBatch {
    pub matches: Vec<RawMatch>,
    pub unreadable: Vec<SkippedBout>,
}

/// Only a payload that is not a JSON array (or null) fails as a whole.
pub fn parse_raw_matches_json(raw: &str) -> Result<RawBatch> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if value.is_null() {
        return Ok(RawBatch::default());
    }
    let records: Vec<serde_json::Value> = serde_json::from_value(value)?;
    let mut batch = RawBatch::default();
    for (idx, record) in records.into_iter().enumerate() {
        let match_id = record_id(&record, idx);
        match serde_json::from_value::<RawMatch>(record) {
            Ok(m) => batch.matches.push(m),
            Err(err) => {
                let err = Error::from(err);
                tracing::warn!(%match_id, "unreadable match record: {err}");
                batch.unreadable.push(SkippedBout {
                    match_id,
                    reason: SkipReason::Rejected {
                        kind: "parse",
                        message: err.to_string(),
                    },
                });
            }
        }
    }
    Ok(batch)
}

fn record_id(record: &serde_json::Value, idx: usize) -> String {
    match record.get("matchID") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => format!("#{idx}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    Placeholder,
    Rejected { kind: &'static str, message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedBout {
    pub match_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub bouts: Vec<Bout>,
    pub skipped: Vec<SkippedBout>,
}

impl IngestReport {
    /// Skip counts keyed by reason tag.
    pub fn skip_summary(&self) -> BTreeMap<&'static str, usize> {
        let mut out = BTreeMap::new();
        for s in &self.skipped {
            let key = match &s.reason {
                SkipReason::Placeholder => "placeholder",
                SkipReason::Rejected { kind, .. } => *kind,
            };
            *out.entry(key).or_insert(0) += 1;
        }
        out
    }
}

enum Built {
    Bout(Bout),
    Skipped(SkippedBout),
}

fn ingest_one(ruleset: Ruleset, raw: &RawMatch) -> Built {
    if raw.is_placeholder() {
        return Built::Skipped(SkippedBout {
            match_id: raw.match_id.clone(),
            reason: SkipReason::Placeholder,
        });
    }
    match raw.build(ruleset) {
        Ok(bout) => Built::Bout(bout),
        Err(err) => {
            tracing::warn!(match_id = %raw.match_id, kind = err.kind(), "skipping match: {err}");
            Built::Skipped(SkippedBout {
                match_id: raw.match_id.clone(),
                reason: SkipReason::Rejected {
                    kind: err.kind(),
                    message: err.to_string(),
                },
            })
        }
    }
}

/// Build every match independently; one bad match never aborts the batch.
/// Output keeps input order regardless of scheduling.
pub fn ingest_batch(ruleset: Ruleset, raws: &[RawMatch], workers: Option<usize>) -> IngestReport {
    let pool = workers.and_then(build_pool);
    let built: Vec<Built> = with_pool(&pool, || {
        raws.par_iter().map(|raw| ingest_one(ruleset, raw)).collect()
    });

    let mut report = IngestReport::default();
    for item in built {
        match item {
            Built::Bout(b) => report.bouts.push(b),
            Built::Skipped(s) => report.skipped.push(s),
        }
    }
    tracing::info!(
        accepted = report.bouts.len(),
        skipped = report.skipped.len(),
        %ruleset,
        "ingested batch"
    );
    report
}

/// [`ingest_batch`] over a decoded dump; unreadable records lead the skip list.
pub fn ingest_raw_batch(ruleset: Ruleset, batch: &RawBatch, workers: Option<usize>) -> IngestReport {
    let mut report = ingest_batch(ruleset, &batch.matches, workers);
    let mut skipped = batch.unreadable.clone();
    skipped.append(&mut report.skipped);
    report.skipped = skipped;
    report
}

fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .ok()
}

fn with_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

fn lenient_int<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<i32, D::Error> {
    match IntOrString::deserialize(d)? {
        IntOrString::Int(v) => i32::try_from(v).map_err(serde::de::Error::custom),
        IntOrString::Str(s) => s.trim().parse::<i32>().map_err(serde::de::Error::custom),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(match IntOrString::deserialize(d)? {
        IntOrString::Int(v) => v.to_string(),
        IntOrString::Str(s) => s.trim().to_string(),
    })
}

fn lenient_date<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<NaiveDate, D::Error> {
    let raw = String::deserialize(d)?;
    let s = raw.trim();
    let s = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y"))
        .map_err(|_| serde::de::Error::custom(format!("unrecognized date {raw:?}")))
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}
