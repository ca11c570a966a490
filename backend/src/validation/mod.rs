//! Post-condition checks for extracted tables.
//!
//! These run after a table has been built and compare it against the source
//! dataset. They recount what the transforms should have produced instead of
//! trusting the transforms, so a bug in an operation shows up here.
//!
//! # Example
//!
//! ```rust,ignore
//! use bankmark::validation::{assert_no_char, assert_boolean_mapping};
//!
//! assert_no_char(&clients, "job", '.')?;
//! assert_boolean_mapping(&clients, &source, "mortgage", "yes")?;
//! ```

use chrono::NaiveDate;

use crate::error::{ValidationError, ValidationResult};
use crate::models::{Column, DataType, Dataset};

/// Look up a column or fail with [`ValidationError::MissingColumn`].
pub fn require_column<'a>(dataset: &'a Dataset, column: &str) -> ValidationResult<&'a Column> {
    dataset
        .column(column)
        .ok_or_else(|| ValidationError::MissingColumn(column.to_string()))
}

/// Column exists and has the given type.
pub fn assert_column_type(
    dataset: &Dataset,
    column: &str,
    expected: DataType,
) -> ValidationResult<()> {
    let col = require_column(dataset, column)?;
    if col.data_type() != expected {
        return Err(ValidationError::WrongType {
            column: column.to_string(),
            expected,
            actual: col.data_type(),
        });
    }
    Ok(())
}

/// Column exists, is text, and no value contains `ch`.
pub fn assert_no_char(dataset: &Dataset, column: &str, ch: char) -> ValidationResult<()> {
    assert_column_type(dataset, column, DataType::Text)?;
    let values = require_column(dataset, column)?.as_text().unwrap_or_default();

    let mut hits = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.as_deref().is_some_and(|s| s.contains(ch)))
        .map(|(row, _)| row);

    match hits.next() {
        None => Ok(()),
        Some(first_row) => Err(ValidationError::ForbiddenChar {
            column: column.to_string(),
            ch,
            count: 1 + hits.count(),
            first_row,
        }),
    }
}

/// Column in `result` is a boolean mapping of the same text column in
/// `original`, with `true_value` as the only true value.
///
/// Both types are checked: a column that is already boolean in `original`
/// fails, even if the counts would line up.
pub fn assert_boolean_mapping(
    result: &Dataset,
    original: &Dataset,
    column: &str,
    true_value: &str,
) -> ValidationResult<()> {
    assert_column_type(result, column, DataType::Boolean)?;
    assert_column_type(original, column, DataType::Text)?;

    let mapped = require_column(result, column)?.as_boolean().unwrap_or_default();
    let source = require_column(original, column)?.as_text().unwrap_or_default();

    let actual_true = mapped.iter().filter(|b| **b).count();
    let actual_false = mapped.len() - actual_true;
    let expected_true = source
        .iter()
        .filter(|v| v.as_deref() == Some(true_value))
        .count();
    let expected_false = source.len() - expected_true;

    if actual_true != expected_true || actual_false != expected_false {
        return Err(ValidationError::BooleanCountMismatch {
            column: column.to_string(),
            expected_true,
            actual_true,
            expected_false,
            actual_false,
        });
    }
    Ok(())
}

/// Same number of rows as the source.
pub fn assert_row_count(result: &Dataset, original: &Dataset) -> ValidationResult<()> {
    if result.row_count() != original.row_count() {
        return Err(ValidationError::RowCountMismatch {
            expected: original.row_count(),
            actual: result.row_count(),
        });
    }
    Ok(())
}

/// Date column with every value in `[start, end)`.
pub fn assert_date_range(
    dataset: &Dataset,
    column: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> ValidationResult<()> {
    assert_column_type(dataset, column, DataType::Date)?;
    let dates = require_column(dataset, column)?.as_date().unwrap_or_default();

    match dates.iter().position(|d| *d < start || *d >= end) {
        None => Ok(()),
        Some(row) => Err(ValidationError::DateOutOfRange {
            column: column.to_string(),
            row,
            value: dates[row],
            start,
            end,
        }),
    }
}

/// None of the named columns are present.
pub fn assert_columns_absent(dataset: &Dataset, columns: &[&str]) -> ValidationResult<()> {
    match columns.iter().find(|c| dataset.has_column(c)) {
        Some(c) => Err(ValidationError::UnexpectedColumn(c.to_string())),
        None => Ok(()),
    }
}

/// Columns are exactly `expected`, in order.
pub fn assert_column_set(dataset: &Dataset, expected: &[&str]) -> ValidationResult<()> {
    let actual = dataset.column_names();
    if actual != expected {
        return Err(ValidationError::ColumnSetMismatch {
            expected: expected.iter().map(|s| s.to_string()).collect(),
            actual: actual.into_iter().map(String::from).collect(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnData;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn original() -> Dataset {
        Dataset::new(vec![
            Column::new("job", ColumnData::text(&["admin_", "blue-collar", ""])),
            Column::new("credit_default", ColumnData::text(&["yes", "no", "yes"])),
        ])
        .unwrap()
    }

    fn mapped(flags: Vec<bool>) -> Dataset {
        Dataset::new(vec![Column::new("credit_default", ColumnData::Boolean(flags))]).unwrap()
    }

    #[test]
    fn test_no_char_passes() {
        assert!(assert_no_char(&original(), "job", '.').is_ok());
    }

    #[test]
    fn test_no_char_reports_rows() {
        let ds = Dataset::new(vec![Column::new(
            "education",
            ColumnData::text(&["basic_4y", "basic.6y", "high.school"]),
        )])
        .unwrap();
        assert_eq!(
            assert_no_char(&ds, "education", '.').unwrap_err(),
            ValidationError::ForbiddenChar {
                column: "education".into(),
                ch: '.',
                count: 2,
                first_row: 1,
            }
        );
    }

    #[test]
    fn test_no_char_missing_column() {
        assert_eq!(
            assert_no_char(&original(), "education", '.').unwrap_err(),
            ValidationError::MissingColumn("education".into())
        );
    }

    #[test]
    fn test_boolean_mapping_passes() {
        let result = mapped(vec![true, false, true]);
        assert!(assert_boolean_mapping(&result, &original(), "credit_default", "yes").is_ok());
    }

    #[test]
    fn test_boolean_mapping_count_mismatch() {
        let result = mapped(vec![true, false, false]);
        assert_eq!(
            assert_boolean_mapping(&result, &original(), "credit_default", "yes").unwrap_err(),
            ValidationError::BooleanCountMismatch {
                column: "credit_default".into(),
                expected_true: 2,
                actual_true: 1,
                expected_false: 1,
                actual_false: 2,
            }
        );
    }

    #[test]
    fn test_boolean_mapping_is_type_sensitive() {
        let result = mapped(vec![true, false, true]);
        // already-mapped column used as the original
        let err = assert_boolean_mapping(&result, &result, "credit_default", "yes").unwrap_err();
        assert_eq!(
            err,
            ValidationError::WrongType {
                column: "credit_default".into(),
                expected: DataType::Text,
                actual: DataType::Boolean,
            }
        );

        // unmapped text column used as the result
        let err = assert_boolean_mapping(&original(), &original(), "credit_default", "yes")
            .unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { expected: DataType::Boolean, .. }));
    }

    #[test]
    fn test_boolean_mapping_missing_column() {
        let err = assert_boolean_mapping(&mapped(vec![true]), &original(), "mortgage", "yes")
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingColumn("mortgage".into()));
    }

    #[test]
    fn test_row_count() {
        let three = original();
        let one = mapped(vec![true]);
        assert!(assert_row_count(&three, &three).is_ok());
        assert_eq!(
            assert_row_count(&one, &three).unwrap_err(),
            ValidationError::RowCountMismatch {
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn test_date_range_bounds() {
        let ds = Dataset::new(vec![Column::new(
            "d",
            ColumnData::Date(vec![date(2022, 1, 1), date(2022, 12, 31)]),
        )])
        .unwrap();
        assert!(assert_date_range(&ds, "d", date(2022, 1, 1), date(2023, 1, 1)).is_ok());

        let late = Dataset::new(vec![Column::new(
            "d",
            ColumnData::Date(vec![date(2022, 5, 1), date(2023, 1, 1)]),
        )])
        .unwrap();
        let err = assert_date_range(&late, "d", date(2022, 1, 1), date(2023, 1, 1)).unwrap_err();
        assert!(matches!(err, ValidationError::DateOutOfRange { row: 1, .. }));
    }

    #[test]
    fn test_date_range_requires_date_type() {
        let err = assert_date_range(&original(), "job", date(2022, 1, 1), date(2023, 1, 1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::WrongType { expected: DataType::Date, .. }));
    }

    #[test]
    fn test_columns_absent() {
        assert!(assert_columns_absent(&original(), &["month", "day"]).is_ok());
        assert_eq!(
            assert_columns_absent(&original(), &["month", "job"]).unwrap_err(),
            ValidationError::UnexpectedColumn("job".into())
        );
    }

    #[test]
    fn test_column_set() {
        assert!(assert_column_set(&original(), &["job", "credit_default"]).is_ok());
        assert!(assert_column_set(&original(), &["credit_default", "job"]).is_err());
        assert!(assert_column_set(&original(), &["job"]).is_err());
    }
}
