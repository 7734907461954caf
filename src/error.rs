use thiserror::Error;

use crate::labels::Ruleset;
use crate::validator::Position;

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed scoring token {token:?}: {message}")]
    Parse { token: String, message: String },

    #[error("label {token:?} is not part of the {ruleset} label set")]
    UnknownLabel { ruleset: Ruleset, token: String },

    #[error("unrecognized result {0:?}")]
    UnknownResult(String),

    #[error("result conflict: {0}")]
    ResultConflict(String),

    #[error("event {index} at {seconds}s is earlier than the previous event at {previous}s")]
    SequenceOrder {
        index: usize,
        seconds: u32,
        previous: u32,
    },

    #[error("event {index} ({label}) is not legal from {position:?}")]
    IllegalTransition {
        index: usize,
        label: String,
        position: Position,
    },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("no baseline sample for {metric} ({ruleset}, {subject})")]
    BaselineNotFound {
        ruleset: Ruleset,
        subject: String,
        metric: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(token: &str, message: impl Into<String>) -> Self {
        Error::Parse {
            token: token.to_string(),
            message: message.into(),
        }
    }

    /// Short machine-friendly tag, used for skip counters.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Parse { .. } => "parse",
            Error::UnknownLabel { .. } => "unknown_label",
            Error::UnknownResult(_) => "unknown_result",
            Error::ResultConflict(_) => "result_conflict",
            Error::SequenceOrder { .. } => "sequence_order",
            Error::IllegalTransition { .. } => "illegal_transition",
            Error::InsufficientData(_) => "insufficient_data",
            Error::BaselineNotFound { .. } => "baseline_not_found",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}
