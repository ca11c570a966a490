//! High-level ETL driver.
//!
//! Combines every step of a run: clearing old outputs, loading the source
//! file, running the three extractors and writing their tables.
//!
//! # Example
//!
//! ```rust,ignore
//! use bankmark::config::EtlConfig;
//! use bankmark::transform::pipeline::run;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = run(&EtlConfig::from_env()?)?;
//!     println!("Wrote {} tables", summary.written().count());
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{EtlConfig, FailurePolicy};
use crate::error::{ExtractResult, PipelineError, PipelineResult};
use crate::extract::Table;
use crate::logs::{log_error, log_info, log_success, log_warning};
use crate::models::Dataset;
use crate::output::{clear_output_files, write_dataset_file};
use crate::parser::{parse_csv_file_auto, ParseResult, SourceSchema};

/// In-memory results of the three extractors.
#[derive(Debug)]
pub struct Extractions {
    pub client: ExtractResult<Dataset>,
    pub campaign: ExtractResult<Dataset>,
    pub economics: ExtractResult<Dataset>,
}

impl Extractions {
    pub fn get(&self, table: Table) -> &ExtractResult<Dataset> {
        match table {
            Table::Client => &self.client,
            Table::Campaign => &self.campaign,
            Table::Economics => &self.economics,
        }
    }
}

/// Run every extractor on `source`, without any I/O.
///
/// Each extractor reads the shared source; a failure in one does not stop
/// the others.
pub fn extract_all(source: &Dataset) -> Extractions {
    Extractions {
        client: Table::Client.extractor().extract(source),
        campaign: Table::Campaign.extractor().extract(source),
        economics: Table::Economics.extractor().extract(source),
    }
}

/// Outcome of one table in a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableStatus {
    Written { path: PathBuf, rows: usize },
    Skipped { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableReport {
    pub table: Table,
    #[serde(flatten)]
    pub status: TableStatus,
}

/// Result of a complete run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: PathBuf,
    pub encoding: String,
    pub delimiter: char,
    pub source_rows: usize,
    /// One entry per table, in run order
    pub tables: Vec<TableReport>,
}

impl RunSummary {
    pub fn written(&self) -> impl Iterator<Item = &TableReport> {
        self.tables
            .iter()
            .filter(|r| matches!(r.status, TableStatus::Written { .. }))
    }

    pub fn skipped(&self) -> impl Iterator<Item = &TableReport> {
        self.tables
            .iter()
            .filter(|r| matches!(r.status, TableStatus::Skipped { .. }))
    }

    /// True when every table was written.
    pub fn is_complete(&self) -> bool {
        self.skipped().next().is_none()
    }
}

/// Load the configured source file with the bank marketing schema.
pub fn load_source(config: &EtlConfig) -> PipelineResult<ParseResult> {
    log_info(format!("Reading '{}'...", config.input_path.display()));
    let parsed = parse_csv_file_auto(
        &config.input_path,
        config.delimiter,
        &SourceSchema::bank_marketing(),
    )?;

    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_success(format!(
        "Detected separator: '{}'",
        format_delimiter(parsed.delimiter)
    ));
    log_success(format!(
        "Read {} rows, {} columns",
        parsed.dataset.row_count(),
        parsed.dataset.column_count()
    ));
    Ok(parsed)
}

/// Run the full ETL described by `config`.
///
/// 1. Clears `*.csv` files from the output directory
/// 2. Loads the source (a missing file stops the run here)
/// 3. For client, campaign and economics: extract, check, write
///
/// With [`FailurePolicy::Abort`] the first failing table ends the run with
/// [`PipelineError::Extract`]; tables written before it stay on disk. With
/// [`FailurePolicy::SkipTable`] the failure is recorded in the summary and
/// the run moves on.
pub fn run(config: &EtlConfig) -> PipelineResult<RunSummary> {
    clear_output_files(&config.output_dir)?;

    let parsed = load_source(config)?;
    let source = &parsed.dataset;

    let mut tables = Vec::with_capacity(Table::ALL.len());
    for table in Table::ALL {
        log_info(format!("Extracting {} table...", table));

        let dataset = match table.extractor().extract(source) {
            Ok(dataset) => dataset,
            Err(err) => match config.failure_policy {
                FailurePolicy::Abort => {
                    log_error(format!("{} extraction failed: {}", table, err));
                    return Err(PipelineError::Extract { table, source: err });
                }
                FailurePolicy::SkipTable => {
                    log_warning(format!("Skipping {} table: {}", table, err));
                    tables.push(TableReport {
                        table,
                        status: TableStatus::Skipped {
                            error: err.to_string(),
                        },
                    });
                    continue;
                }
            },
        };

        let path = config.output_path(table);
        write_dataset_file(&dataset, &path)?;
        log_success(format!(
            "Wrote {} rows to '{}'",
            dataset.row_count(),
            path.display()
        ));

        tables.push(TableReport {
            table,
            status: TableStatus::Written {
                path,
                rows: dataset.row_count(),
            },
        });
    }

    let summary = RunSummary {
        input: config.input_path.clone(),
        encoding: parsed.encoding.clone(),
        delimiter: parsed.delimiter,
        source_rows: source.row_count(),
        tables,
    };

    if summary.is_complete() {
        log_success("All tables extracted");
    } else {
        log_warning(format!(
            "{} of {} tables skipped",
            summary.skipped().count(),
            summary.tables.len()
        ));
    }
    Ok(summary)
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        _ => d.to_string(),
    }
}
