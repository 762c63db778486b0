use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::application::{BalanceService, Chaincode};
use crate::config::{HostConfig, LogFormat};
use crate::domain::{EntryPoint, ParsePolicy};
use crate::io::SnapshotEntry;
use crate::storage::SqliteStore;

/// Poynts - local host for the balance chaincode
#[derive(Parser)]
#[command(name = "poynts")]
#[command(about = "Run the poynts balance chaincode against a local SQLite world state")]
#[command(version)]
pub struct Cli {
    /// Database file path (overrides POYNTS_DATABASE)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Reject malformed numbers instead of treating them as zero
    #[arg(long, global = true, conflicts_with = "lenient")]
    pub strict: bool,

    /// Treat malformed numbers as zero, even if POYNTS_PARSE_POLICY=strict
    #[arg(long, global = true)]
    pub lenient: bool,

    /// Print invocation results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log format: text, json (overrides POYNTS_LOG_FORMAT)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the world state database
    Setup,

    /// Call the chaincode Init entry point (the first argument is reserved)
    Init {
        /// Arguments; every one after the first is a bucket to zero
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Call a state-mutating function (init, add, deduct)
    Invoke {
        /// Function name
        function: String,

        /// Function arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Call a read-only function (balance)
    Query {
        /// Function name
        function: String,

        /// Function arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// List every bucket in the world state
    State,

    /// Export the world state to CSV or JSON
    Export {
        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Seed the world state from CSV or JSON
    Import {
        /// Input file (stdin if omitted)
        input: Option<String>,

        /// Format: csv, json (default: from file extension, else csv)
        #[arg(short, long)]
        format: Option<String>,

        /// Validate without writing
        #[arg(long)]
        dry_run: bool,
    },
}

/// Result of a single chaincode call as printed with `--json`
#[derive(Debug, Serialize)]
pub struct InvocationOutput {
    pub tx_id: Uuid,
    pub entry: String,
    pub function: String,
    pub payload: String,
}

impl Cli {
    /// Layer command-line flags over the environment configuration.
    pub fn apply(&self, mut config: HostConfig) -> Result<HostConfig> {
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if self.strict {
            config.parse_policy = ParsePolicy::Strict;
        }
        if self.lenient {
            config.parse_policy = ParsePolicy::Lenient;
        }
        if let Some(format) = &self.log_format {
            config.log_format = LogFormat::from_str(format)
                .with_context(|| format!("Invalid log format '{}'. Use text or json", format))?;
        }
        Ok(config)
    }

    pub async fn run(self, config: HostConfig) -> Result<()> {
        match self.command {
            Commands::Setup => {
                SqliteStore::open(&config.database).await?;
                println!("Database initialized: {}", config.database);
            }

            Commands::Init { args } => {
                let service = open_service(&config).await?;
                let output = call(&service, None, "init", &args).await?;
                print_output(&output, self.json)?;
            }

            Commands::Invoke { function, args } => {
                let service = open_service(&config).await?;
                let output = call(&service, Some(EntryPoint::Invoke), &function, &args).await?;
                print_output(&output, self.json)?;
            }

            Commands::Query { function, args } => {
                let service = open_service(&config).await?;
                let output = call(&service, Some(EntryPoint::Query), &function, &args).await?;
                print_output(&output, self.json)?;
            }

            Commands::State => {
                let store = SqliteStore::open(&config.database).await?;
                run_state_command(&store, self.json).await?;
            }

            Commands::Export { format, output } => {
                let store = SqliteStore::open(&config.database).await?;
                run_export_command(&store, &format, output.as_deref()).await?;
            }

            Commands::Import {
                input,
                format,
                dry_run,
            } => {
                let store = SqliteStore::open(&config.database).await?;
                run_import_command(&store, input.as_deref(), format.as_deref(), dry_run).await?;
            }
        }

        Ok(())
    }
}

async fn open_service(config: &HostConfig) -> Result<BalanceService<SqliteStore>> {
    let store = SqliteStore::open(&config.database).await?;
    Ok(BalanceService::new(store).with_policy(config.parse_policy))
}

/// Run one chaincode call as its own transaction. `entry` of None is the host
/// Init entry point.
pub async fn call<C: Chaincode>(
    chaincode: &C,
    entry: Option<EntryPoint>,
    function: &str,
    args: &[String],
) -> Result<InvocationOutput> {
    let tx_id = Uuid::new_v4();
    let entry_name = entry.map(|e| e.as_str()).unwrap_or("init");
    let span = tracing::info_span!("tx", tx_id = %tx_id, entry = entry_name);

    let payload = async {
        match entry {
            None => chaincode.init(function, args).await,
            Some(EntryPoint::Invoke) => chaincode.invoke(function, args).await,
            Some(EntryPoint::Query) => chaincode.query(function, args).await,
        }
    }
    .instrument(span)
    .await?;

    Ok(InvocationOutput {
        tx_id,
        entry: entry_name.to_string(),
        function: function.to_string(),
        payload: String::from_utf8_lossy(&payload).into_owned(),
    })
}

/// Text printed for a call: the payload, or the whole output as JSON.
fn render_output(output: &InvocationOutput, json: bool) -> Result<Option<String>> {
    if json {
        Ok(Some(serde_json::to_string(output)?))
    } else if output.payload.is_empty() {
        Ok(None)
    } else {
        Ok(Some(output.payload.clone()))
    }
}

fn print_output(output: &InvocationOutput, json: bool) -> Result<()> {
    if let Some(line) = render_output(output, json)? {
        println!("{}", line);
    }
    Ok(())
}

async fn run_state_command(store: &SqliteStore, json: bool) -> Result<()> {
    let entries = store.entries().await?;

    if json {
        let entries: Vec<SnapshotEntry> = entries
            .into_iter()
            .map(|entry| SnapshotEntry {
                key: entry.key,
                value: String::from_utf8_lossy(&entry.value).into_owned(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No buckets found.");
    } else {
        println!("{:<24} {:>20} {:<25}", "KEY", "VALUE", "UPDATED");
        println!("{}", "-".repeat(71));
        for entry in entries {
            println!(
                "{:<24} {:>20} {:<25}",
                entry.key,
                String::from_utf8_lossy(&entry.value),
                entry.updated_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }
    Ok(())
}

async fn run_export_command(store: &SqliteStore, format: &str, output: Option<&str>) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(store);

    // Determine output writer
    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        "csv" => exporter.export_csv(writer).await?,
        "json" => exporter.export_json(writer).await?.entries.len(),
        _ => {
            anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format);
        }
    };

    if output.is_some() {
        eprintln!("Exported {} buckets", count);
    }

    Ok(())
}

async fn run_import_command(
    store: &SqliteStore,
    input: Option<&str>,
    format: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    let importer = Importer::new(store);

    // Determine input reader
    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let format = match (format, input) {
        (Some(format), _) => format,
        (None, Some(path)) if path.ends_with(".json") => "json",
        _ => "csv",
    };

    let options = ImportOptions { dry_run };

    let result = match format {
        "csv" => importer.import_csv(reader, options).await?,
        "json" => importer.import_json(reader, options).await?,
        _ => {
            anyhow::bail!("Invalid import format '{}'. Valid formats: csv, json", format);
        }
    };

    // Display results
    if dry_run {
        println!("Validation complete");
    } else {
        println!("Import complete");
    }
    println!("  Imported: {}", result.imported);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in result.errors.iter().take(10) {
            println!(
                "  Line {}: {}",
                error.line,
                error
                    .field
                    .as_ref()
                    .map(|f| format!("{}: ", f))
                    .unwrap_or_default()
                    + &error.error
            );
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_parse_invoke_with_negative_delta() {
        let cli = Cli::try_parse_from(["poynts", "invoke", "deduct", "alice", "-5"]).unwrap();
        match cli.command {
            Commands::Invoke { function, args } => {
                assert_eq!(function, "deduct");
                assert_eq!(args, vec!["alice".to_string(), "-5".to_string()]);
            }
            _ => panic!("expected invoke"),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "poynts",
            "--database",
            "other.db",
            "--strict",
            "--log-format",
            "json",
            "state",
        ])
        .unwrap();

        let config = cli.apply(HostConfig::default()).unwrap();
        assert_eq!(config.database, "other.db");
        assert_eq!(config.parse_policy, ParsePolicy::Strict);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::try_parse_from(["poynts", "setup"]).unwrap();
        let base = HostConfig {
            database: "env.db".to_string(),
            parse_policy: ParsePolicy::Strict,
            log_format: LogFormat::Json,
        };
        assert_eq!(cli.apply(base.clone()).unwrap(), base);
    }

    #[test]
    fn test_lenient_flag_overrides_strict_env() {
        let cli = Cli::try_parse_from(["poynts", "--lenient", "state"]).unwrap();
        let base = HostConfig {
            parse_policy: ParsePolicy::Strict,
            ..HostConfig::default()
        };
        assert_eq!(
            cli.apply(base).unwrap().parse_policy,
            ParsePolicy::Lenient
        );
    }

    #[test]
    fn test_strict_and_lenient_conflict() {
        assert!(Cli::try_parse_from(["poynts", "--strict", "--lenient", "state"]).is_err());
    }

    #[tokio::test]
    async fn test_call_through_every_entry_point() {
        let service = BalanceService::new(MemoryStore::with_entries(&[("k", "100")]));
        let args = |values: &[&str]| values.iter().map(|v| v.to_string()).collect::<Vec<_>>();

        let init = call(&service, None, "init", &args(&["_", "fresh"]))
            .await
            .unwrap();
        assert_eq!(init.entry, "init");
        assert_eq!(init.payload, "");
        assert_eq!(render_output(&init, false).unwrap(), None);

        let invoke = call(&service, Some(EntryPoint::Invoke), "add", &args(&["k", "10"]))
            .await
            .unwrap();
        assert_eq!(invoke.payload, "110");
        assert_eq!(render_output(&invoke, false).unwrap(), Some("110".to_string()));

        let query = call(&service, Some(EntryPoint::Query), "balance", &args(&["k"]))
            .await
            .unwrap();
        assert_eq!(query.payload, "110");
        assert_ne!(query.tx_id, invoke.tx_id);

        let line = render_output(&invoke, true).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["tx_id"], invoke.tx_id.to_string());
        assert_eq!(json["entry"], "invoke");
        assert_eq!(json["function"], "add");
        assert_eq!(json["payload"], "110");
        assert_eq!(json.as_object().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_call_surfaces_chaincode_errors() {
        let service = BalanceService::new(MemoryStore::new());
        let err = call(&service, Some(EntryPoint::Query), "add", &[])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Received unknown function query: add");
    }

    #[test]
    fn test_rejects_bad_log_format() {
        let cli = Cli::try_parse_from(["poynts", "--log-format", "xml", "setup"]).unwrap();
        assert!(cli.apply(HostConfig::default()).is_err());
    }
}
