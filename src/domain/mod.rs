mod balance;
mod operation;

pub use balance::*;
pub use operation::*;
