use std::env;
use std::path::PathBuf;

use crate::labels::Ruleset;
use crate::percentile::Subject;

/// Runtime settings, read from the environment (a `.env` file is loaded by the binary).
#[derive(Debug, Clone)]
pub struct Settings {
    pub ruleset: Ruleset,
    pub subject: Subject,
    pub baseline_dir: Option<PathBuf>,
    pub worker_threads: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ruleset: Ruleset::College,
            subject: Subject::Individual,
            baseline_dir: None,
            worker_threads: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        let ruleset = opt_env("MAT_RULESET")
            .and_then(|val| match val.parse::<Ruleset>() {
                Ok(r) => Some(r),
                Err(err) => {
                    tracing::warn!("ignoring MAT_RULESET: {err}");
                    None
                }
            })
            .unwrap_or(defaults.ruleset);
        let subject = opt_env("MAT_SUBJECT")
            .and_then(|val| match val.parse::<Subject>() {
                Ok(s) => Some(s),
                Err(err) => {
                    tracing::warn!("ignoring MAT_SUBJECT: {err}");
                    None
                }
            })
            .unwrap_or(defaults.subject);
        let baseline_dir = opt_env("MAT_BASELINE_DIR").map(PathBuf::from);
        let worker_threads = opt_env("MAT_WORKERS")
            .and_then(|val| val.parse::<usize>().ok())
            .map(|n| n.clamp(1, 64));
        Self {
            ruleset,
            subject,
            baseline_dir,
            worker_threads,
        }
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val) })
}
