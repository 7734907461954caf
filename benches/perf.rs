use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use chrono::NaiveDate;

use mat_metrics::baseline::BaselineSet;
use mat_metrics::bout::Bout;
use mat_metrics::ingest::{RawMatch, ingest_batch, parse_raw_matches_json};
use mat_metrics::kpi::build_metric_records;
use mat_metrics::labels::Ruleset;
use mat_metrics::metrics::PositionTally;
use mat_metrics::percentile::{Subject, percentile_of_score};
use mat_metrics::roster::{Grouping, roster_rows};
use mat_metrics::synthetic::synthetic_season;

fn season() -> Vec<RawMatch> {
    let start = NaiveDate::from_ymd_opt(2025, 11, 1).expect("valid date");
    synthetic_season(11, Ruleset::College, start, 30, 20)
}

fn season_bouts() -> Vec<Bout> {
    ingest_batch(Ruleset::College, &season(), None).bouts
}

fn bench_fixture_parse(c: &mut Criterion) {
    c.bench_function("raw_matches_parse", |b| {
        b.iter(|| {
            let rows = parse_raw_matches_json(black_box(MATCHES_JSON)).unwrap();
            black_box(rows.matches.len());
        })
    });
}

fn bench_ingest(c: &mut Criterion) {
    let raws = season();
    c.bench_function("ingest_season_600", |b| {
        b.iter(|| {
            let report = ingest_batch(Ruleset::College, black_box(&raws), None);
            black_box(report.bouts.len());
        })
    });
}

fn bench_tally(c: &mut Criterion) {
    let bouts = season_bouts();
    c.bench_function("tally_sum_sequential", |b| {
        b.iter(|| {
            let tally: PositionTally = black_box(&bouts).iter().sum();
            black_box(tally);
        })
    });
    c.bench_function("tally_sum_parallel", |b| {
        b.iter(|| black_box(PositionTally::par_sum(black_box(&bouts))))
    });
}

fn bench_reports(c: &mut Criterion) {
    let bouts = season_bouts();
    let sample: Vec<f64> = (0..2_000).map(|i| (i % 97) as f64 * 0.37).collect();
    let baselines = BaselineSet::empty();

    c.bench_function("roster_rows_wrestler", |b| {
        b.iter(|| {
            let rows = roster_rows(black_box(&bouts), Ruleset::College, Grouping::Wrestler);
            black_box(rows.matches.len());
        })
    });
    c.bench_function("metric_records", |b| {
        b.iter(|| {
            let records =
                build_metric_records(Ruleset::College, Subject::Individual, black_box(&bouts), &baselines);
            black_box(records.len());
        })
    });
    c.bench_function("percentile_of_score_2k", |b| {
        b.iter(|| black_box(percentile_of_score(black_box(&sample), 17.5)))
    });
}

criterion_group!(
    perf,
    bench_fixture_parse,
    bench_ingest,
    bench_tally,
    bench_reports
);
criterion_main!(perf);

static MATCHES_JSON: &str = include_str!("../tests/fixtures/matches_college.json");
