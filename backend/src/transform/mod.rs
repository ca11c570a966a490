//! Transformation module.
//!
//! - Operations: column transforms (`substitute_char`, `map_string_to_boolean`, `derive_date`)
//! - Plan: declarative projection + operation list per table
//! - Pipeline: the full ETL run

pub mod operations;
pub mod pipeline;
pub mod plan;

pub use operations::{
    derive_date, map_string_to_boolean, month_number, substitute_char, Operation, Outcome,
    DEFAULT_DATE_COLUMN,
};
pub use plan::{execute, ExtractionPlan, PlanOutput};
