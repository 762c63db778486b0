//! Local host configuration loaded from environment variables.
//!
//! All settings come from the environment (or a `.env` file via `dotenvy`);
//! command-line flags override them.
//!
//! | Variable              | Default     |
//! |-----------------------|-------------|
//! | `POYNTS_DATABASE`     | `poynts.db` |
//! | `POYNTS_PARSE_POLICY` | `lenient`   |
//! | `POYNTS_LOG_FORMAT`   | `text`      |

use anyhow::{Result, bail};

use crate::domain::ParsePolicy;

/// Default SQLite file for the world state.
pub const DEFAULT_DATABASE: &str = "poynts.db";

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Settings of the local host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// SQLite file holding the world state.
    pub database: String,

    /// Treatment of malformed stored values and deltas.
    pub parse_policy: ParsePolicy,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            parse_policy: ParsePolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl HostConfig {
    /// Loads configuration from the process environment, reading `.env` first
    /// if one exists.
    ///
    /// # Errors
    ///
    /// Fails if `POYNTS_PARSE_POLICY` or `POYNTS_LOG_FORMAT` is set to an
    /// unknown value.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(database) = lookup("POYNTS_DATABASE").filter(|v| !v.is_empty()) {
            config.database = database;
        }

        if let Some(value) = lookup("POYNTS_PARSE_POLICY") {
            config.parse_policy = match ParsePolicy::from_str(&value) {
                Some(policy) => policy,
                None => bail!("Invalid POYNTS_PARSE_POLICY '{}': use lenient or strict", value),
            };
        }

        if let Some(value) = lookup("POYNTS_LOG_FORMAT") {
            config.log_format = match LogFormat::from_str(&value) {
                Some(format) => format,
                None => bail!("Invalid POYNTS_LOG_FORMAT '{}': use text or json", value),
            };
        }

        Ok(config)
    }
}
