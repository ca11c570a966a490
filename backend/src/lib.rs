//! # Bankmark - bank marketing ETL
//!
//! Bankmark splits a flat bank marketing campaign export into three
//! normalized tables (client, campaign, economics), cleaning and typing
//! columns on the way and validating every table before it is written.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Extractors │────▶│  3 x CSV    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (plan+check)│     │  (output/)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bankmark::{run, EtlConfig};
//!
//! fn main() {
//!     let summary = run(&EtlConfig::default()).unwrap();
//!     println!("Wrote {} tables", summary.written().count());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Typed columnar dataset
//! - [`logs`] - Progress log stream
//! - [`config`] - Run configuration
//! - [`parser`] - CSV loading with auto-detection
//! - [`transform`] - Column transforms, extraction plans and the run driver
//! - [`validation`] - Post-condition checks
//! - [`extract`] - Client, campaign and economics extractors
//! - [`output`] - Output CSV files

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Configuration
pub mod config;

// Input / output
pub mod output;
pub mod parser;

// Transformation
pub mod extract;
pub mod transform;

// Validation
pub mod validation;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, CsvError, DatasetError, ExtractError, OutputError, PipelineError,
    TransformError, ValidationError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Column, ColumnData, DataType, Dataset};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{EtlConfig, FailurePolicy};

// =============================================================================
// Re-exports - Transforms
// =============================================================================

pub use transform::{
    derive_date, map_string_to_boolean, substitute_char, ExtractionPlan, Operation, Outcome,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{assert_boolean_mapping, assert_no_char};

// =============================================================================
// Re-exports - Extractors
// =============================================================================

pub use extract::{CampaignExtractor, ClientExtractor, EconomicsExtractor, Extractor, Table};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{extract_all, run, Extractions, RunSummary, TableReport, TableStatus};
