use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::labels::Ruleset;
use crate::metrics::MetricKind;
use crate::percentile::{RankBucket, Subject, percentile_of_score};

static GLOBAL: OnceCell<BaselineSet> = OnceCell::new();

/// One reference population: every metric's sample of prior values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineFile {
    pub ruleset: Ruleset,
    pub subject: Subject,
    #[serde(default)]
    pub metrics: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BaselineDoc {
    Many(Vec<BaselineFile>),
    One(BaselineFile),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranking {
    pub percentile: f64,
    pub rank: RankBucket,
}

/// Read-only reference samples keyed by `(ruleset, subject)`.
#[derive(Debug, Clone, Default)]
pub struct BaselineSet {
    tables: HashMap<(Ruleset, Subject), BTreeMap<MetricKind, Vec<f64>>>,
}

impl BaselineSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_files(files: impl IntoIterator<Item = BaselineFile>) -> Self {
        let mut set = Self::default();
        for file in files {
            set.insert(file.ruleset, file.subject, file.metrics);
        }
        set
    }

    /// Either one baseline object or an array of them.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let doc: BaselineDoc = serde_json::from_str(raw)?;
        Ok(match doc {
            BaselineDoc::Many(files) => Self::from_files(files),
            BaselineDoc::One(file) => Self::from_files([file]),
        })
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Directory layout: `<dir>/<college|high_school>/<wrestler|team>_metrics.json`, each a
    /// plain `{ metric: [values] }` map. Missing files are skipped.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut set = Self::default();
        for ruleset in [Ruleset::College, Ruleset::HighSchool] {
            for subject in [Subject::Individual, Subject::Team] {
                let path = dir
                    .join(ruleset.key())
                    .join(format!("{}_metrics.json", subject.file_stem()));
                if !path.is_file() {
                    tracing::debug!(path = %path.display(), "no baseline file");
                    continue;
                }
                let raw = fs::read_to_string(&path)?;
                let metrics: BTreeMap<String, Vec<f64>> = serde_json::from_str(&raw)?;
                set.insert(ruleset, subject, metrics);
            }
        }
        tracing::info!(tables = set.tables.len(), dir = %dir.display(), "loaded baselines");
        Ok(set)
    }

    fn insert(&mut self, ruleset: Ruleset, subject: Subject, metrics: BTreeMap<String, Vec<f64>>) {
        let table = self.tables.entry((ruleset, subject)).or_default();
        for (key, values) in metrics {
            match key.parse::<MetricKind>() {
                Ok(kind) => {
                    table.insert(kind, values);
                }
                Err(err) => tracing::warn!("skipping baseline column: {err}"),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn sample(&self, ruleset: Ruleset, subject: Subject, metric: MetricKind) -> Result<&[f64]> {
        self.tables
            .get(&(ruleset, subject))
            .and_then(|t| t.get(&metric))
            .filter(|values| !values.is_empty())
            .map(Vec::as_slice)
            .ok_or_else(|| Error::BaselineNotFound {
                ruleset,
                subject: subject.to_string(),
                metric: metric.key().to_string(),
            })
    }

    pub fn rank(
        &self,
        ruleset: Ruleset,
        subject: Subject,
        metric: MetricKind,
        value: f64,
    ) -> Result<Ranking> {
        let sample = self.sample(ruleset, subject, metric)?;
        let percentile = percentile_of_score(sample, value).ok_or_else(|| {
            Error::InsufficientData(format!("no finite baseline values for {metric}"))
        })?;
        Ok(Ranking {
            percentile,
            rank: RankBucket::from_percentile(percentile),
        })
    }
}

/// Process-wide baselines, loaded once on first use and never mutated afterwards.
pub fn global(settings: &Settings) -> Result<&'static BaselineSet> {
    GLOBAL.get_or_try_init(|| match settings.baseline_dir.as_deref() {
        Some(dir) if dir.is_file() => BaselineSet::load_file(dir),
        Some(dir) => BaselineSet::load_dir(dir),
        None => {
            tracing::debug!("MAT_BASELINE_DIR unset; ranking disabled");
            Ok(BaselineSet::empty())
        }
    })
}
