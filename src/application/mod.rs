// Application layer - the chaincode itself.
// The host (CLI, test harness, ledger runtime) owns the store and hands it
// to the service; nothing here outlives a single call.

pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
