//! Bankmark CLI - split a bank marketing export into normalized tables
//!
//! # Commands
//!
//! ```bash
//! bankmark run                       # Full ETL with config from env / .env
//! bankmark run --input data.csv      # Override the source file
//! bankmark run --json-log log.json   # Keep the run log as JSON
//! bankmark inspect data.csv          # Show detected encoding, delimiter, types
//! bankmark plans                     # Print extraction plans as JSON
//! bankmark clean                     # Delete CSV files from the output dir
//! ```

use clap::{Parser, Subcommand};
use bankmark::config::{parse_delimiter, EtlConfig, FailurePolicy};
use bankmark::logs::capture;
use bankmark::output::clear_output_files;
use bankmark::parser::{parse_csv_file_auto, SourceSchema};
use bankmark::transform::pipeline::{format_delimiter, run, TableStatus};
use bankmark::Table;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bankmark")]
#[command(about = "Split bank marketing data into normalized tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full ETL: clear outputs, load, extract, validate, write
    Run {
        /// Input CSV file (default: BANKMARK_INPUT or data/bank_marketing.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (default: BANKMARK_OUTPUT_DIR or output)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<String>,

        /// Keep going when a table fails
        #[arg(long)]
        skip_failed: bool,

        /// Also write the run's log entries to this file as JSON
        #[arg(long)]
        json_log: Option<PathBuf>,
    },

    /// Load a CSV file and show what was detected
    Inspect {
        /// Input CSV file
        file: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<String>,
    },

    /// Print the extraction plan of every table as JSON
    Plans,

    /// Delete CSV files from the output directory
    Clean {
        /// Output directory (default: BANKMARK_OUTPUT_DIR or output)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            output_dir,
            delimiter,
            skip_failed,
            json_log,
        } => cmd_run(
            input,
            output_dir,
            delimiter.as_deref(),
            skip_failed,
            json_log.as_deref(),
        ),

        Commands::Inspect { file, delimiter } => cmd_inspect(&file, delimiter.as_deref()),

        Commands::Plans => cmd_plans(),

        Commands::Clean { output_dir } => cmd_clean(output_dir),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_run(
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    delimiter: Option<&str>,
    skip_failed: bool,
    json_log: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = EtlConfig::from_env()?;
    if let Some(input) = input {
        config.input_path = input;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if let Some(d) = delimiter {
        config.delimiter = Some(parse_delimiter(d)?);
    }
    if skip_failed {
        config.failure_policy = FailurePolicy::SkipTable;
    }

    eprintln!("📄 Processing: {}", config.input_path.display());

    let (result, entries) = capture(|| run(&config));
    if let Some(path) = json_log {
        fs::write(path, serde_json::to_string_pretty(&entries)?)?;
        eprintln!("💾 Log written to: {}", path.display());
    }
    let summary = result?;

    eprintln!("\n📊 Results ({} source rows):", summary.source_rows);
    for report in &summary.tables {
        match &report.status {
            TableStatus::Written { path, rows } => {
                eprintln!("   ✅ {}: {} rows → {}", report.table, rows, path.display());
            }
            TableStatus::Skipped { error } => {
                eprintln!("   ⚠️  {}: skipped ({})", report.table, error);
            }
        }
    }

    if !summary.is_complete() {
        std::process::exit(1);
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_inspect(file: &Path, delimiter: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Inspecting: {}", file.display());

    let delimiter = delimiter.map(parse_delimiter).transpose()?;
    let result = parse_csv_file_auto(file, delimiter, &SourceSchema::bank_marketing())?;

    println!("Encoding: {}", result.encoding);
    println!(
        "Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    println!("Rows: {}", result.dataset.row_count());
    println!("Columns ({}):", result.dataset.column_count());
    for (i, (name, data_type)) in result.dataset.schema().iter().enumerate() {
        println!("  [{:2}] {} ({})", i + 1, name, data_type);
    }

    Ok(())
}

fn cmd_plans() -> Result<(), Box<dyn std::error::Error>> {
    let plans: Vec<_> = Table::ALL.iter().map(|t| t.extractor().plan()).collect();
    println!("{}", serde_json::to_string_pretty(&plans)?);
    Ok(())
}

fn cmd_clean(output_dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = EtlConfig::from_env()?;
    let dir = output_dir.unwrap_or(config.output_dir);

    let deleted = clear_output_files(&dir)?;
    eprintln!("🗑️  Deleted {} file(s) from {}", deleted.len(), dir.display());
    Ok(())
}
