use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::core::{
    interval::Interval,
    reading::{Convention, Reading},
};

pub mod json;
pub mod memory;

#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    derive_more::From,
    derive_more::FromStr,
)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl Display for ClientId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metered site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,

    /// eGauge device host name.
    #[serde(default)]
    pub hostname: String,

    #[serde(default = "Client::default_active")]
    pub active: bool,
}

impl Client {
    const fn default_active() -> bool {
        true
    }
}

/// Time-ordered readings of one sensor column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnSeries {
    pub convention: Convention,
    pub readings: Vec<Reading>,
}

impl ColumnSeries {
    /// Sort the readings and drop repeated timestamps, keeping the first one.
    pub fn new(convention: Convention, mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|reading| reading.timestamp);
        readings.dedup_by_key(|reading| reading.timestamp);
        Self { convention, readings }
    }

    /// First and last timestamp.
    #[must_use]
    pub fn data_range(&self) -> Option<Interval> {
        Some(Interval::new(self.readings.first()?.timestamp, self.readings.last()?.timestamp))
    }

    /// Readings within the closed window.
    #[must_use]
    pub fn within(&self, window: Interval) -> &[Reading] {
        let start = self.readings.partition_point(|reading| reading.timestamp < window.start);
        let end = self.readings.partition_point(|reading| reading.timestamp <= window.end);
        &self.readings[start..end.max(start)]
    }
}

/// Where the readings come from.
pub trait ReadingSource {
    fn client(&self, id: ClientId) -> Option<Client>;

    /// Sensor column names in storage order.
    fn columns(&self, id: ClientId) -> Vec<String>;

    /// Readings of the column within the closed window.
    fn series(&self, id: ClientId, column: &str, window: Interval) -> Option<ColumnSeries>;

    /// Timestamps of the first and the last reading of the column.
    fn data_range(&self, id: ClientId, column: &str) -> Option<Interval>;
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_new_sorts_and_deduplicates() {
        let series = ColumnSeries::new(
            Convention::Power,
            vec![
                Reading::new(at(3), 3.0),
                Reading::new(at(1), 1.0),
                Reading::new(at(3), 4.0),
                Reading::new(at(2), 2.0),
            ],
        );
        let values: Vec<f64> = series.readings.iter().map(|reading| reading.value).collect();
        assert_eq!(values, [1.0, 2.0, 3.0]);
        assert_eq!(series.data_range(), Some(Interval::new(at(1), at(3))));
    }

    #[test]
    fn test_within_is_closed() {
        let readings = (0..10).map(|hour| Reading::new(at(hour), 1.0)).collect();
        let series = ColumnSeries::new(Convention::Power, readings);
        assert_eq!(series.within(Interval::new(at(2), at(5))).len(), 4);
        assert!(series.within(Interval::new(at(5), at(2))).is_empty());
        assert!(ColumnSeries::default().data_range().is_none());
    }

    #[test]
    fn test_client_id_from_str() {
        assert_eq!("42".parse::<ClientId>().unwrap(), ClientId(42));
        assert_eq!(ClientId(42).to_string(), "42");
    }
}
