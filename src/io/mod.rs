// World state snapshots: CSV and JSON export, and seeding a store from them.

pub mod export;
pub mod import;

pub use export::*;
pub use import::*;
