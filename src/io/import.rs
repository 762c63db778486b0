use anyhow::{Context, Result};
use std::io::Read;

use crate::domain::{encode_balance, parse_balance};
use crate::io::export::{SnapshotEntry, StateSnapshot};
use crate::storage::StateStore;

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
}

/// Importer for seeding a state store from a snapshot.
///
/// Only values that parse as base-10 integers are written, so an import can
/// never put a non-numeric balance into the store.
pub struct Importer<'a, S> {
    store: &'a S,
}

impl<'a, S: StateStore> Importer<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Import entries from CSV with a `key,value` header
    pub async fn import_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut entries = Vec::new();
        let mut result = ImportResult::default();

        for (line_num, record) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            entries.push((
                line,
                SnapshotEntry {
                    key: record.get(0).unwrap_or("").to_string(),
                    value: record.get(1).unwrap_or("").to_string(),
                },
            ));
        }
        drop(csv_reader);

        self.write_entries(entries, options, result).await
    }

    /// Import entries from a JSON snapshot. Line numbers in errors are the
    /// 1-based position of the entry in the snapshot.
    pub async fn import_json<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let snapshot: StateSnapshot =
            serde_json::from_reader(reader).context("Failed to parse JSON snapshot")?;

        let entries = snapshot
            .entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| (i + 1, entry))
            .collect();

        self.write_entries(entries, options, ImportResult::default())
            .await
    }

    async fn write_entries(
        &self,
        entries: Vec<(usize, SnapshotEntry)>,
        options: ImportOptions,
        mut result: ImportResult,
    ) -> Result<ImportResult> {
        for (line, entry) in entries {
            if entry.key.is_empty() {
                result.errors.push(ImportError {
                    line,
                    field: Some("key".to_string()),
                    error: "Key must not be empty".to_string(),
                });
                continue;
            }

            let balance = match parse_balance(&entry.value) {
                Ok(b) => b,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: Some("value".to_string()),
                        error: format!("Invalid balance: {}", e),
                    });
                    continue;
                }
            };

            if !options.dry_run {
                self.store
                    .put(&entry.key, encode_balance(balance))
                    .await
                    .with_context(|| format!("Failed to import key '{}'", entry.key))?;
            }
            result.imported += 1;
        }

        Ok(result)
    }
}
