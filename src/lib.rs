pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

pub use application::{BalanceService, Chaincode, ChaincodeError};
pub use domain::*;
pub use storage::{MemoryStore, SqliteStore, StateStore, StoreError};
