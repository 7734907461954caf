pub mod baseline;
pub mod bout;
pub mod config;
pub mod error;
pub mod event;
pub mod ingest;
pub mod kpi;
pub mod labels;
pub mod metrics;
pub mod outcome;
pub mod percentile;
pub mod roster;
pub mod synthetic;
pub mod telemetry;
pub mod trend;
pub mod validator;

pub use error::{Error, Result};
