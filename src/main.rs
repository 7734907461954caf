use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Serialize;

use mat_metrics::baseline;
use mat_metrics::config::Settings;
use mat_metrics::ingest::{RawBatch, SkippedBout, ingest_raw_batch, parse_raw_matches_json};
use mat_metrics::kpi::{MetricRecord, build_metric_records};
use mat_metrics::labels::Ruleset;
use mat_metrics::percentile::Subject;
use mat_metrics::roster::{Grouping, RosterRow, roster_rows};
use mat_metrics::synthetic::synthetic_season;
use mat_metrics::telemetry;

const USAGE: &str = "usage: mat_metrics <matches.json | --demo> [--team] [--ruleset college|high_school]";

enum Source {
    File(PathBuf),
    Demo,
}

struct Args {
    source: Source,
    team: bool,
    ruleset: Option<Ruleset>,
}

fn parse_args() -> Result<Args> {
    let mut source = None;
    let mut team = false;
    let mut ruleset = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => source = Some(Source::Demo),
            "--team" => team = true,
            "--ruleset" => {
                let raw = args.next().context("--ruleset needs a value")?;
                ruleset = Some(raw.parse::<Ruleset>().map_err(anyhow::Error::msg)?);
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown flag {other}\n{USAGE}"),
            path => source = Some(Source::File(PathBuf::from(path))),
        }
    }
    let Some(source) = source else {
        bail!("{USAGE}");
    };
    Ok(Args {
        source,
        team,
        ruleset,
    })
}

#[derive(Serialize)]
struct Report<'a> {
    ruleset: Ruleset,
    subject: Subject,
    accepted: usize,
    skipped: &'a [SkippedBout],
    roster: Vec<RosterRow>,
    metrics: Vec<MetricRecord>,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    telemetry::init_tracing();

    let args = parse_args()?;
    let mut settings = Settings::from_env();
    if let Some(ruleset) = args.ruleset {
        settings.ruleset = ruleset;
    }
    if args.team {
        settings.subject = Subject::Team;
    }

    let raws = match &args.source {
        Source::File(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read matches from {}", path.display()))?;
            parse_raw_matches_json(&raw)
                .with_context(|| format!("parse matches in {}", path.display()))?
        }
        Source::Demo => {
            let start = NaiveDate::from_ymd_opt(2025, 11, 1).context("demo start date")?;
            RawBatch {
                matches: synthetic_season(26, settings.ruleset, start, 6, 12),
                unreadable: Vec::new(),
            }
        }
    };

    let report = ingest_raw_batch(settings.ruleset, &raws, settings.worker_threads);
    let baselines = baseline::global(&settings).context("load baselines")?;

    let grouping = match settings.subject {
        Subject::Individual => Grouping::Wrestler,
        Subject::Team => Grouping::Team,
    };
    let out = Report {
        ruleset: settings.ruleset,
        subject: settings.subject,
        accepted: report.bouts.len(),
        skipped: &report.skipped,
        roster: roster_rows(&report.bouts, settings.ruleset, grouping),
        metrics: build_metric_records(settings.ruleset, settings.subject, &report.bouts, baselines),
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
