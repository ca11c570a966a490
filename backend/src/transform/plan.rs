//! Extraction plans
//!
//! A plan says which source columns an output table is built from and which
//! operations run on them, in order. Plans are plain data and serialize to
//! JSON, so `bankmark plans` can show exactly what a run will do.

use serde::{Deserialize, Serialize};

use super::operations::{Operation, Outcome};
use crate::error::TransformResult;
use crate::logs::log_warning_indent;
use crate::models::Dataset;

/// Projection plus ordered operations for one output table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionPlan {
    /// Output table name
    pub table: String,

    /// Source columns to copy, in output order
    pub columns: Vec<String>,

    /// Operations applied after projection
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl ExtractionPlan {
    pub fn new(table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            table: table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            operations: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Result of executing a plan
#[derive(Debug, Clone)]
pub struct PlanOutput {
    /// Dataset after all operations
    pub dataset: Dataset,
    /// Warnings from operations that found a column missing
    pub warnings: Vec<String>,
}

/// Execute a plan against the source dataset.
///
/// The source is only read: projection copies the columns, and the
/// operations work on that copy. A missing projection column is an error;
/// a missing column inside an operation is logged and skipped.
pub fn execute(source: &Dataset, plan: &ExtractionPlan) -> TransformResult<PlanOutput> {
    let mut dataset = source.select(&plan.columns)?;
    let mut warnings = Vec::new();

    for operation in &plan.operations {
        dataset = match operation.apply(dataset)? {
            Outcome::Transformed(next) => next,
            Outcome::Unchanged { dataset, warning } => {
                log_warning_indent(&warning, 1);
                warnings.push(warning);
                dataset
            }
        };
    }

    Ok(PlanOutput { dataset, warnings })
}
