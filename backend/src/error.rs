//! Error types for the bankmark ETL pipeline.
//!
//! One error enum per layer:
//!
//! - [`DatasetError`] - Dataset construction and projection errors
//! - [`CsvError`] - Source file loading errors
//! - [`TransformError`] - Column transform errors
//! - [`ValidationError`] - Post-condition failures
//! - [`ExtractError`] - Failure of a single extractor
//! - [`OutputError`] - Output file errors
//! - [`ConfigError`] - Configuration errors
//! - [`PipelineError`] - Top-level run errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

use crate::models::DataType;

// =============================================================================
// Dataset Errors
// =============================================================================

/// Errors while building or projecting a dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    /// Two columns share a name.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// A column does not have the dataset's row count.
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A requested column does not exist.
    #[error("Missing column: {0}")]
    MissingColumn(String),
}

// =============================================================================
// CSV Loading Errors
// =============================================================================

/// Errors while loading the source CSV file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Input file does not exist.
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode file content.
    #[error("Failed to decode content as {0}")]
    EncodingError(String),

    /// Malformed CSV.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Delimiter is not a single-byte ASCII character.
    #[error("Unsupported delimiter '{0}'")]
    InvalidDelimiter(char),

    /// A row has more cells than the header.
    #[error("Line {line}: expected {expected} fields, saw {actual}")]
    ExtraFields {
        line: usize,
        expected: usize,
        actual: usize,
    },

    /// A cell could not be coerced to its declared type.
    #[error("Line {line}, column '{column}' (value '{value}'): expected {expected}")]
    InvalidValue {
        line: usize,
        column: String,
        value: String,
        expected: DataType,
    },

    /// The parsed columns do not form a valid dataset.
    #[error("Invalid dataset: {0}")]
    Dataset(#[from] DatasetError),
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors raised by column transforms.
///
/// A missing column is not an error here; transforms report it as an
/// [`crate::transform::Outcome::Unchanged`] warning instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// Column exists but has the wrong type for the operation.
    #[error("Column '{column}' is {actual}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },

    /// Month name not in the `jan`..`dec` table.
    #[error("Row {row}: unknown month name '{value}'")]
    UnknownMonth { row: usize, value: String },

    /// A cell required to build a value is missing.
    #[error("Row {row}: missing value in column '{column}'")]
    MissingValue { row: usize, column: String },

    /// Year, month and day do not form a calendar date.
    #[error("Row {row}: {year}-{month:02}-{day:02} is not a valid date")]
    InvalidDate {
        row: usize,
        year: i32,
        month: u32,
        day: i64,
    },

    /// Dataset error (projection, replacement).
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Post-condition failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Expected column is missing.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Column that should have been removed is still present.
    #[error("Unexpected column: {0}")]
    UnexpectedColumn(String),

    /// Column has the wrong type.
    #[error("Column '{column}' is {actual}, expected {expected}")]
    WrongType {
        column: String,
        expected: DataType,
        actual: DataType,
    },

    /// Column still contains a forbidden character.
    #[error("Column '{column}' contains '{ch}' in {count} row(s), first at row {first_row}")]
    ForbiddenChar {
        column: String,
        ch: char,
        count: usize,
        first_row: usize,
    },

    /// Boolean column does not match the original categorical split.
    #[error(
        "Column '{column}' maps {actual_true} true / {actual_false} false, \
         expected {expected_true} / {expected_false}"
    )]
    BooleanCountMismatch {
        column: String,
        expected_true: usize,
        actual_true: usize,
        expected_false: usize,
        actual_false: usize,
    },

    /// Row count changed.
    #[error("Row count is {actual}, expected {expected}")]
    RowCountMismatch { expected: usize, actual: usize },

    /// Date outside the allowed range.
    #[error("Column '{column}' row {row}: {value} is outside [{start}, {end})")]
    DateOutOfRange {
        column: String,
        row: usize,
        value: chrono::NaiveDate,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// A year whose `[year-01-01, year+1-01-01)` range is not representable.
    #[error("Year {0} is outside the supported date range")]
    YearOutOfRange(i32),

    /// Column list differs from the expected output layout.
    #[error("Columns are {actual:?}, expected {expected:?}")]
    ColumnSetMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

// =============================================================================
// Extraction Errors
// =============================================================================

/// Failure of one extractor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// A transform failed.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// The result did not pass validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<DatasetError> for ExtractError {
    fn from(err: DatasetError) -> Self {
        ExtractError::Transform(TransformError::Dataset(err))
    }
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while writing or clearing output files.
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error on a specific path.
    #[error("IO error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

impl OutputError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        OutputError::Io {
            path: path.into(),
            source,
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Environment variable holds an unusable value.
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level run errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Source loading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// One extractor failed.
    #[error("{table} extraction failed: {source}")]
    Extract {
        table: crate::extract::Table,
        #[source]
        source: ExtractError,
    },

    /// Output error.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Result type for CSV loading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transforms.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for extractors.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for output operations.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // DatasetError -> ExtractError
        let err: ExtractError = DatasetError::MissingColumn("age".into()).into();
        assert!(matches!(
            err,
            ExtractError::Transform(TransformError::Dataset(_))
        ));
        assert!(err.to_string().contains("age"));

        // CsvError -> PipelineError
        let pipeline_err: PipelineError = CsvError::EmptyFile.into();
        assert!(pipeline_err.to_string().contains("empty"));
    }

    #[test]
    fn test_validation_error_format() {
        let err = ValidationError::ForbiddenChar {
            column: "job".into(),
            ch: '.',
            count: 2,
            first_row: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("job"));
        assert!(msg.contains("'.'"));
        assert!(msg.contains("2 row(s)"));
    }

    #[test]
    fn test_invalid_date_format() {
        let err = TransformError::InvalidDate {
            row: 3,
            year: 2022,
            month: 2,
            day: 30,
        };
        assert_eq!(err.to_string(), "Row 3: 2022-02-30 is not a valid date");
    }

    #[test]
    fn test_pipeline_extract_error_names_table() {
        let err = PipelineError::Extract {
            table: crate::extract::Table::Campaign,
            source: ValidationError::MissingColumn("last_contact_date".into()).into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("campaign extraction failed"));
        assert!(msg.contains("last_contact_date"));
    }
}
