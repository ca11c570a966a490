//! Campaign table: how and when each client was contacted, and the outcome.
//!
//! The source only has a month name and a day number for the last contact.
//! Both are folded into one `last_contact_date` pinned to a fixed year, and
//! the two source columns are dropped.

use chrono::NaiveDate;

use super::{Extractor, Table};
use crate::error::{ValidationError, ValidationResult};
use crate::models::{DataType, Dataset};
use crate::transform::operations::{Operation, DEFAULT_DATE_COLUMN};
use crate::transform::plan::ExtractionPlan;
use crate::validation::{
    assert_boolean_mapping, assert_column_set, assert_column_type, assert_columns_absent,
    assert_date_range, assert_row_count,
};

/// Year every last-contact date is placed in.
pub const CONTACT_YEAR: i32 = 2022;

/// Source columns read by the extractor.
const SOURCE_COLUMNS: [&str; 8] = [
    "client_id",
    "number_contacts",
    "contact_duration",
    "previous_campaign_contacts",
    "previous_outcome",
    "campaign_outcome",
    "month",
    "day",
];

/// Output columns, in order.
pub const COLUMNS: [&str; 7] = [
    "client_id",
    "number_contacts",
    "contact_duration",
    "previous_campaign_contacts",
    "previous_outcome",
    "campaign_outcome",
    DEFAULT_DATE_COLUMN,
];

const INTEGER_COLUMNS: [&str; 4] = [
    "client_id",
    "number_contacts",
    "contact_duration",
    "previous_campaign_contacts",
];

/// Outcome columns and the value that means true.
const OUTCOMES: [(&str, &str); 2] = [("previous_outcome", "success"), ("campaign_outcome", "yes")];

#[derive(Debug, Clone, Copy)]
pub struct CampaignExtractor {
    /// Year for `last_contact_date`
    pub year: i32,
}

impl Default for CampaignExtractor {
    fn default() -> Self {
        Self { year: CONTACT_YEAR }
    }
}

impl CampaignExtractor {
    pub fn with_year(year: i32) -> Self {
        Self { year }
    }

    /// `[year-01-01, year+1-01-01)`
    fn date_range(&self) -> ValidationResult<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.year, 1, 1);
        let end = self
            .year
            .checked_add(1)
            .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1));
        start
            .zip(end)
            .ok_or(ValidationError::YearOutOfRange(self.year))
    }
}

impl Extractor for CampaignExtractor {
    fn table(&self) -> Table {
        Table::Campaign
    }

    fn plan(&self) -> ExtractionPlan {
        let mut plan = ExtractionPlan::new(Table::Campaign.name(), &SOURCE_COLUMNS);
        for (column, true_value) in OUTCOMES {
            plan = plan.with_operation(Operation::MapToBoolean {
                column: column.to_string(),
                true_value: true_value.to_string(),
            });
        }
        plan.with_operation(Operation::DeriveDate {
            day_column: "day".to_string(),
            month_column: "month".to_string(),
            year: self.year,
            target: DEFAULT_DATE_COLUMN.to_string(),
        })
    }

    fn check(&self, result: &Dataset, source: &Dataset) -> ValidationResult<()> {
        assert_row_count(result, source)?;

        for column in INTEGER_COLUMNS {
            assert_column_type(result, column, DataType::Integer)?;
        }
        for (column, true_value) in OUTCOMES {
            assert_boolean_mapping(result, source, column, true_value)?;
        }

        assert_column_type(result, DEFAULT_DATE_COLUMN, DataType::Date)?;
        let (start, end) = self.date_range()?;
        assert_date_range(result, DEFAULT_DATE_COLUMN, start, end)?;
        assert_columns_absent(result, &["month", "day"])?;

        assert_column_set(result, &COLUMNS)
    }
}
