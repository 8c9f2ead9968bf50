use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use searchcounter_logging::LogConfig;
use searchcounter_storage::RedbStoreConfig;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CounterError;

/// Settings loaded from an optional TOML file, then overridden by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// redb file holding the search history
    pub database: Option<PathBuf>,
    /// Vocabulary used by `increment` when no `--term` is given
    pub terms: Vec<String>,
    /// redb page cache size in bytes
    pub cache_size: Option<usize>,
    /// Keys given here override [`LogConfig::cli`], not the library default
    #[serde(deserialize_with = "deserialize_log")]
    pub log: LogConfig,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            database: None,
            terms: Vec::new(),
            cache_size: None,
            log: LogConfig::cli(),
        }
    }
}

impl CounterConfig {
    /// Load a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CounterError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CounterError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CounterError> {
        toml::from_str(contents).map_err(|e| CounterError::config(e.to_string()))
    }

    /// Apply command-line overrides on top of file values
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(database) = &cli.database {
            self.database = Some(database.clone());
        }
        if let Some(level) = &cli.log_level {
            self.log.default_level = level.clone();
        }
    }

    /// redb settings for the configured database
    ///
    /// # Errors
    ///
    /// [`CounterError::Config`] if no database path was given.
    pub fn store_config(&self) -> Result<RedbStoreConfig, CounterError> {
        let db_path = self.database.clone().ok_or_else(|| {
            CounterError::config("no database configured (use --database or SEARCHCOUNTER_DATABASE)")
        })?;

        let mut store_config = RedbStoreConfig::at(db_path);
        if let Some(cache_size) = self.cache_size {
            store_config.cache_size = cache_size;
        }
        Ok(store_config)
    }
}

/// Deserialize a `[log]` section as overrides on top of [`LogConfig::cli`]
///
/// Keeps console output on stderr unless the file asks otherwise.
fn deserialize_log<'de, D: Deserializer<'de>>(deserializer: D) -> Result<LogConfig, D::Error> {
    let overrides = toml::Table::deserialize(deserializer)?;

    let mut merged = match toml::Value::try_from(LogConfig::cli()).map_err(D::Error::custom)? {
        toml::Value::Table(table) => table,
        other => {
            return Err(D::Error::custom(format!(
                "log preset is not a table: {other}"
            )));
        }
    };
    merge_tables(&mut merged, overrides);

    toml::Value::Table(merged)
        .try_into()
        .map_err(D::Error::custom)
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "searchcounter", about = "Sliding-window search counter", version)]
pub struct Cli {
    /// Path to the redb database used for persistence. The file does not need to exist
    #[arg(long, global = true, env = "SEARCHCOUNTER_DATABASE", value_name = "FILENAME")]
    pub database: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(long, global = true, env = "SEARCHCOUNTER_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SEARCHCOUNTER_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Add a search to the collection
    Increment {
        /// Terms to choose from when creating the search (repeatable)
        #[arg(long = "term", value_name = "TERM")]
        terms: Vec<String>,
    },
    /// Number of searches made in the past minute
    NumLastMinute,
    /// Number of searches made in the last SECONDS seconds
    NumArbitraryLookback {
        #[arg(allow_negative_numbers = true)]
        seconds: i64,
    },
    /// Most commonly searched term in the last SECONDS seconds
    MostCommonTerm {
        #[arg(allow_negative_numbers = true)]
        seconds: i64,
    },
    /// Record synthetic searches into an in-memory store and report on them
    Simulate {
        /// Number of searches to record
        #[arg(long, default_value_t = 100)]
        count: usize,
        /// Simulated time between searches, in milliseconds
        #[arg(long, default_value_t = 1000)]
        spacing_ms: u64,
        /// Terms to choose from (repeatable)
        #[arg(long = "term", value_name = "TERM")]
        terms: Vec<String>,
        /// Seed for term selection
        #[arg(long)]
        seed: Option<u64>,
    },
}
