//! Run configuration.
//!
//! Defaults can be overridden from the environment (or a `.env` file):
//!
//! | Variable                  | Default                    |
//! |---------------------------|----------------------------|
//! | `BANKMARK_INPUT`          | `data/bank_marketing.csv`  |
//! | `BANKMARK_OUTPUT_DIR`     | `output`                   |
//! | `BANKMARK_DELIMITER`      | auto-detect                |
//! | `BANKMARK_FAILURE_POLICY` | `abort` (or `skip`)        |

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::extract::Table;

pub const ENV_INPUT: &str = "BANKMARK_INPUT";
pub const ENV_OUTPUT_DIR: &str = "BANKMARK_OUTPUT_DIR";
pub const ENV_DELIMITER: &str = "BANKMARK_DELIMITER";
pub const ENV_FAILURE_POLICY: &str = "BANKMARK_FAILURE_POLICY";

/// What to do when one extractor fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the run; tables already written stay on disk.
    #[default]
    Abort,
    /// Log the failure and continue with the next table.
    SkipTable,
}

impl FailurePolicy {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" | "skip_table" => Ok(FailurePolicy::SkipTable),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_FAILURE_POLICY.to_string(),
                value: value.to_string(),
                reason: "expected 'abort' or 'skip'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Source CSV
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub client_file: String,
    pub campaign_file: String,
    pub economics_file: String,
    /// `None` = detect from the header line
    pub delimiter: Option<char>,
    pub failure_policy: FailurePolicy,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/bank_marketing.csv"),
            output_dir: PathBuf::from("output"),
            client_file: "client.csv".to_string(),
            campaign_file: "campaign.csv".to_string(),
            economics_file: "economics.csv".to_string(),
            delimiter: None,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl EtlConfig {
    /// Defaults overridden by `BANKMARK_*` variables, after loading `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`EtlConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(input) = lookup(ENV_INPUT).filter(|v| !v.is_empty()) {
            config.input_path = PathBuf::from(input);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.is_empty()) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(delimiter) = lookup(ENV_DELIMITER).filter(|v| !v.is_empty()) {
            config.delimiter = Some(parse_delimiter(&delimiter)?);
        }
        if let Some(policy) = lookup(ENV_FAILURE_POLICY).filter(|v| !v.is_empty()) {
            config.failure_policy = FailurePolicy::parse(&policy)?;
        }

        Ok(config)
    }

    /// Output file name for a table.
    pub fn file_name(&self, table: Table) -> &str {
        match table {
            Table::Client => &self.client_file,
            Table::Campaign => &self.campaign_file,
            Table::Economics => &self.economics_file,
        }
    }

    pub fn output_path(&self, table: Table) -> PathBuf {
        self.output_dir.join(self.file_name(table))
    }
}

/// Parse a delimiter value. `\t` and `tab` mean tab.
pub fn parse_delimiter(value: &str) -> Result<char, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: ENV_DELIMITER.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if value == "\\t" || value.eq_ignore_ascii_case("tab") {
        return Ok('\t');
    }

    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        (Some(_), None) => Err(invalid("delimiter must be ASCII")),
        _ => Err(invalid("expected a single character")),
    }
}
