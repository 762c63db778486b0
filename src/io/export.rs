use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::storage::SqliteStore;

/// One bucket in a snapshot. Values are kept as text since every balance is
/// a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub key: String,
    pub value: String,
}

/// Full world state snapshot for export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub entries: Vec<SnapshotEntry>,
}

/// Exporter for dumping the world state to various formats
pub struct Exporter<'a> {
    store: &'a SqliteStore,
}

impl<'a> Exporter<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    async fn snapshot_entries(&self) -> Result<Vec<SnapshotEntry>> {
        Ok(self
            .store
            .entries()
            .await?
            .into_iter()
            .map(|entry| SnapshotEntry {
                key: entry.key,
                value: String::from_utf8_lossy(&entry.value).into_owned(),
            })
            .collect())
    }

    /// Export the world state to CSV (`key,value`, ordered by key)
    pub async fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let entries = self.snapshot_entries().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["key", "value"])?;

        for entry in &entries {
            csv_writer.write_record([&entry.key, &entry.value])?;
        }

        csv_writer.flush()?;
        Ok(entries.len())
    }

    /// Export the world state as a JSON snapshot
    pub async fn export_json<W: Write>(&self, mut writer: W) -> Result<StateSnapshot> {
        let snapshot = StateSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            entries: self.snapshot_entries().await?,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
