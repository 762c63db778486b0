use serde::{Deserialize, Serialize};

/// The two ways a host calls into the chaincode after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    /// State-mutating calls
    Invoke,
    /// Read-only calls
    Query,
}

impl EntryPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Invoke => "invoke",
            EntryPoint::Query => "query",
        }
    }

    /// Noun used in "unknown function" messages.
    pub fn call_noun(&self) -> &'static str {
        match self {
            EntryPoint::Invoke => "invocation",
            EntryPoint::Query => "query",
        }
    }
}

impl std::fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Zero every listed bucket (argument 0 is reserved)
    Init,
    /// Credit a bucket
    Add,
    /// Debit a bucket
    Deduct,
    /// Read a bucket
    Balance,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Init,
        Operation::Add,
        Operation::Deduct,
        Operation::Balance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Add => "add",
            Operation::Deduct => "deduct",
            Operation::Balance => "balance",
        }
    }

    /// Function names are matched exactly, as the host sends them.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "init" => Some(Operation::Init),
            "add" => Some(Operation::Add),
            "deduct" => Some(Operation::Deduct),
            "balance" => Some(Operation::Balance),
            _ => None,
        }
    }

    pub fn entry_point(&self) -> EntryPoint {
        match self {
            Operation::Init | Operation::Add | Operation::Deduct => EntryPoint::Invoke,
            Operation::Balance => EntryPoint::Query,
        }
    }

    /// Resolve a function name for the given entry point.
    /// Returns None for unknown names and for names routed through the wrong entry point.
    pub fn resolve(entry: EntryPoint, function: &str) -> Option<Self> {
        Self::from_str(function).filter(|op| op.entry_point() == entry)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
