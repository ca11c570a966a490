//! Economics table: macro indicators at contact time. Projection only.

use super::{Extractor, Table};
use crate::error::ValidationResult;
use crate::models::{DataType, Dataset};
use crate::transform::plan::ExtractionPlan;
use crate::validation::{assert_column_set, assert_column_type, assert_row_count};

/// Output columns and their types.
const SCHEMA: [(&str, DataType); 3] = [
    ("client_id", DataType::Integer),
    ("cons_price_idx", DataType::Float),
    ("euribor_three_months", DataType::Float),
];

/// Output columns, in order.
pub const COLUMNS: [&str; 3] = [SCHEMA[0].0, SCHEMA[1].0, SCHEMA[2].0];

#[derive(Debug, Clone, Copy, Default)]
pub struct EconomicsExtractor;

impl Extractor for EconomicsExtractor {
    fn table(&self) -> Table {
        Table::Economics
    }

    fn plan(&self) -> ExtractionPlan {
        ExtractionPlan::new(Table::Economics.name(), &COLUMNS)
    }

    fn check(&self, result: &Dataset, source: &Dataset) -> ValidationResult<()> {
        assert_row_count(result, source)?;
        for (column, data_type) in SCHEMA {
            assert_column_type(result, column, data_type)?;
        }
        assert_column_set(result, &COLUMNS)
    }
}
