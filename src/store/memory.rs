use std::collections::BTreeMap;

use crate::{
    core::interval::Interval,
    store::{Client, ClientId, ColumnSeries, ReadingSource},
};

struct Entry {
    client: Client,
    columns: Vec<(String, ColumnSeries)>,
}

/// Readings held in memory, for embedding and for tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: BTreeMap<ClientId, Entry>,
}

impl MemoryStore {
    /// Add the client with its columns, replacing any client with the same ID.
    #[must_use]
    pub fn with_client(
        mut self,
        client: Client,
        columns: impl IntoIterator<Item = (String, ColumnSeries)>,
    ) -> Self {
        self.insert(client, columns);
        self
    }

    pub fn insert(
        &mut self,
        client: Client,
        columns: impl IntoIterator<Item = (String, ColumnSeries)>,
    ) {
        let entry = Entry { client, columns: columns.into_iter().collect() };
        self.entries.insert(entry.client.id, entry);
    }

    #[must_use]
    pub fn clients(&self) -> Vec<Client> {
        self.entries.values().map(|entry| entry.client.clone()).collect()
    }

    fn column(&self, id: ClientId, column: &str) -> Option<&ColumnSeries> {
        self.entries
            .get(&id)?
            .columns
            .iter()
            .find_map(|(name, series)| (name == column).then_some(series))
    }
}

impl ReadingSource for MemoryStore {
    fn client(&self, id: ClientId) -> Option<Client> {
        self.entries.get(&id).map(|entry| entry.client.clone())
    }

    fn columns(&self, id: ClientId) -> Vec<String> {
        self.entries
            .get(&id)
            .map(|entry| entry.columns.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    fn series(&self, id: ClientId, column: &str, window: Interval) -> Option<ColumnSeries> {
        let series = self.column(id, column)?;
        let readings = series.within(window).to_vec();
        Some(ColumnSeries { convention: series.convention, readings })
    }

    fn data_range(&self, id: ClientId, column: &str) -> Option<Interval> {
        self.column(id, column)?.data_range()
    }
}
