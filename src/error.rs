use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{core::interval::Interval, store::ClientId};

/// Failures that abort a billing computation without a partial result.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum BillingError {
    #[error("invalid billing window {window}: {reason}")]
    InvalidWindow { window: Interval, reason: &'static str },

    #[error("insufficient data: {n_readings} reading(s) in the billing window, at least 2 needed")]
    InsufficientData { n_readings: usize },

    #[error("unknown sensor column `{column}`")]
    UnknownColumn { column: String },

    #[error("invalid price configuration: `{field}` is {value}")]
    InvalidPriceConfig { field: &'static str, value: f64 },

    #[error("unknown client #{0}")]
    UnknownClient(ClientId),

    #[error("client #{0} has no sensor columns")]
    NoColumns(ClientId),
}

/// Non-fatal finding reported alongside a successful result.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// Cumulative counter went backwards, the interval contributed nothing.
    #[serde(rename_all = "camelCase")]
    CounterReset { at: DateTime<Utc>, delta: f64 },

    /// Interval longer than the allowed gap, the span contributed nothing.
    #[serde(rename_all = "camelCase")]
    Gap { from: DateTime<Utc>, to: DateTime<Utc> },

    /// Reading not later than its predecessor, skipped.
    #[serde(rename_all = "camelCase")]
    OutOfOrder { at: DateTime<Utc> },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CounterReset { at, delta } => {
                write!(f, "counter reset at {at} (Δ = {delta}), counted as zero")
            }
            Self::Gap { from, to } => write!(f, "no data between {from} and {to}"),
            Self::OutOfOrder { at } => write!(f, "out-of-order reading at {at}, skipped"),
        }
    }
}
