use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single sample of one sensor column.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Reading {
    pub const fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl From<(DateTime<Utc>, f64)> for Reading {
    fn from((timestamp, value): (DateTime<Utc>, f64)) -> Self {
        Self::new(timestamp, value)
    }
}

/// How the values of a sensor column are to be read.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Convention {
    /// Instantaneous power, kilowatts.
    #[default]
    Power,

    /// Monotonic cumulative energy counter, kilowatt-hours.
    Counter,
}
