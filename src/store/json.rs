use std::{fmt::Debug, fs, path::Path};

use serde::Deserialize;

use crate::{
    core::reading::{Convention, Reading},
    prelude::*,
    store::{Client, ColumnSeries, memory::MemoryStore},
};

/// Exported readings: clients with their sensor columns.
#[derive(Deserialize)]
struct Document {
    clients: Vec<ClientDocument>,
}

#[derive(Deserialize)]
struct ClientDocument {
    #[serde(flatten)]
    client: Client,

    #[serde(default)]
    columns: Vec<ColumnDocument>,
}

#[derive(Deserialize)]
struct ColumnDocument {
    name: String,

    #[serde(default)]
    convention: Convention,

    #[serde(default)]
    readings: Vec<Reading>,
}

impl MemoryStore {
    #[instrument(name = "Reading the store…")]
    pub fn read_from<P: AsRef<Path> + Debug>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read(path).with_context(|| format!("failed to read `{}`", path.display()))?;
        Self::from_json(&contents).with_context(|| format!("failed to parse `{}`", path.display()))
    }

    pub fn from_json(contents: &[u8]) -> Result<Self> {
        let document: Document = serde_json::from_slice(contents)?;
        let mut store = Self::default();
        for ClientDocument { client, columns } in document.clients {
            debug!(id = %client.id, name = %client.name, n_columns = columns.len(), "loaded");
            store.insert(
                client,
                columns.into_iter().map(|column| {
                    (column.name, ColumnSeries::new(column.convention, column.readings))
                }),
            );
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        core::interval::Interval,
        store::{ClientId, ReadingSource},
    };

    #[test]
    fn test_from_json() {
        let store = MemoryStore::from_json(
            br#"{
                "clients": [
                    {
                        "id": 3,
                        "name": "Hotel Centro",
                        "columns": [
                            {
                                "name": "Grid [kWh]",
                                "convention": "counter",
                                "readings": [
                                    {"timestamp": "2025-01-15T12:15:00Z", "value": 1002.5},
                                    {"timestamp": "2025-01-15T12:00:00Z", "value": 1000.0}
                                ]
                            },
                            {"name": "Solar"}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let client = store.client(ClientId(3)).unwrap();
        assert_eq!(client.name, "Hotel Centro");
        assert!(client.active);
        assert_eq!(store.columns(ClientId(3)), ["Grid [kWh]", "Solar"]);

        let start = Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 1, 15, 12, 15, 0).unwrap();
        assert_eq!(store.data_range(ClientId(3), "Grid [kWh]"), Some(Interval::new(start, end)));
        let series = store.series(ClientId(3), "Grid [kWh]", Interval::new(start, end)).unwrap();
        assert_eq!(series.convention, Convention::Counter);
        assert_eq!(series.readings[0], Reading::new(start, 1000.0));
    }

    #[test]
    fn test_malformed_json() {
        assert!(MemoryStore::from_json(br#"{"clients": [{"name": "no id"}]}"#).is_err());
    }
}
