use std::fmt;

use serde::{Deserialize, Serialize};

/// Balances are signed whole quantities stored as decimal strings.
/// There is no floor: a bucket may go negative.
pub type Balance = i64;

/// Encode a balance the way it is written to the state store.
/// Example: 110 -> b"110", -5 -> b"-5"
pub fn encode_balance(balance: Balance) -> Vec<u8> {
    balance.to_string().into_bytes()
}

/// Strictly parse a decimal balance: optional sign, ASCII digits, nothing else.
pub fn parse_balance(input: &str) -> Result<Balance, ParseBalanceError> {
    input
        .parse::<Balance>()
        .map_err(|_| ParseBalanceError::InvalidFormat(input.to_string()))
}

/// How malformed numbers (stored values and deltas) are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Anything that is not a valid integer counts as zero.
    /// Malformed stored data therefore never raises; it is silently reset
    /// on the next write.
    #[default]
    Lenient,
    /// Malformed input is rejected and nothing is written.
    Strict,
}

impl ParsePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParsePolicy::Lenient => "lenient",
            ParsePolicy::Strict => "strict",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lenient" => Some(ParsePolicy::Lenient),
            "strict" => Some(ParsePolicy::Strict),
            _ => None,
        }
    }

    /// Parse text under this policy.
    pub fn parse(&self, input: &str) -> Result<Balance, ParseBalanceError> {
        match self {
            ParsePolicy::Lenient => Ok(parse_balance(input).unwrap_or(0)),
            ParsePolicy::Strict => parse_balance(input),
        }
    }

    /// Parse raw stored bytes under this policy. Non-UTF-8 bytes are malformed.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Balance, ParseBalanceError> {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.parse(text),
            Err(_) => match self {
                ParsePolicy::Lenient => Ok(0),
                ParsePolicy::Strict => Err(ParseBalanceError::InvalidFormat(
                    String::from_utf8_lossy(bytes).into_owned(),
                )),
            },
        }
    }
}

impl fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseBalanceError {
    InvalidFormat(String),
}

impl fmt::Display for ParseBalanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseBalanceError::InvalidFormat(input) => {
                write!(f, "invalid integer: {:?}", input)
            }
        }
    }
}

impl std::error::Error for ParseBalanceError {}
