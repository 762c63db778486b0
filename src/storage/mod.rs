mod memory;
mod sqlite;

use std::future::Future;

use thiserror::Error;

pub use memory::*;
pub use sqlite::*;

/// SQL migration for the world state table
pub const MIGRATION_001_WORLD_STATE: &str = include_str!("migrations/001_world_state.sql");

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    #[error("Failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },
}

/// Key-value state supplied by the host runtime.
///
/// `get` returns `Ok(None)` for a key that was never written. There is no
/// enumeration, batching or transaction support at this boundary; isolation
/// between concurrent invocations is the host's concern.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;

    fn put(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<(), StoreError>> + Send;
}
