// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use poynts::application::BalanceService;
use poynts::storage::{MemoryStore, SqliteStore};
use tempfile::TempDir;

/// Turn string literals into chaincode arguments
pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Helper to create a service over an in-memory store seeded with `entries`.
/// The returned store shares state with the one inside the service.
pub fn memory_service(entries: &[(&str, &str)]) -> (BalanceService<MemoryStore>, MemoryStore) {
    let store = MemoryStore::with_entries(entries);
    (BalanceService::new(store.clone()), store)
}

/// Helper to create a SQLite store in a temporary directory
pub async fn test_store() -> Result<(SqliteStore, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let store = SqliteStore::open(db_path.to_str().unwrap()).await?;
    Ok((store, temp_dir))
}

/// Helper to create a service over a temporary SQLite store
pub async fn sqlite_service() -> Result<(BalanceService<SqliteStore>, TempDir)> {
    let (store, temp_dir) = test_store().await?;
    Ok((BalanceService::new(store), temp_dir))
}
