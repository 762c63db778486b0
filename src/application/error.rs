use thiserror::Error;

use crate::domain::{Balance, EntryPoint, ParseBalanceError};
use crate::storage::StoreError;

/// Per-invocation failure returned to the host. None of these are retried.
#[derive(Error, Debug)]
pub enum ChaincodeError {
    #[error("Incorrect number of arguments. Expecting {expected}")]
    Argument { expected: usize, got: usize },

    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: StoreError,
    },

    #[error("Entity not found {0}")]
    NotFound(String),

    #[error("Received unknown function {}: {name}", .entry.call_noun())]
    UnknownOperation { entry: EntryPoint, name: String },

    #[error("Expecting integer value: {0}")]
    InvalidNumber(#[from] ParseBalanceError),

    #[error("Balance overflow for {key}: {value} with delta {delta}")]
    Overflow {
        key: String,
        value: Balance,
        delta: Balance,
    },
}

impl ChaincodeError {
    pub(crate) fn storage(message: impl Into<String>, source: StoreError) -> Self {
        ChaincodeError::Storage {
            message: message.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ChaincodeError::Argument {
            expected: 1,
            got: 3,
        };
        assert_eq!(
            err.to_string(),
            "Incorrect number of arguments. Expecting 1"
        );

        let err = ChaincodeError::NotFound("alice".to_string());
        assert_eq!(err.to_string(), "Entity not found alice");

        let err = ChaincodeError::UnknownOperation {
            entry: EntryPoint::Invoke,
            name: "transfer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Received unknown function invocation: transfer"
        );

        let err = ChaincodeError::UnknownOperation {
            entry: EntryPoint::Query,
            name: "add".to_string(),
        };
        assert_eq!(err.to_string(), "Received unknown function query: add");
    }

    #[test]
    fn test_storage_keeps_source() {
        use std::error::Error as _;

        let err = ChaincodeError::storage(
            "Error retrieving balance",
            StoreError::Read {
                key: "bob".to_string(),
                reason: "disk on fire".to_string(),
            },
        );
        assert_eq!(err.to_string(), "Error retrieving balance");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("Failed to read key 'bob': disk on fire".to_string())
        );
    }
}
