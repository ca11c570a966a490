//! Column transform operations
//!
//! Each operation takes a dataset by value and returns an [`Outcome`]:
//! either the transformed dataset, or the untouched dataset plus a warning
//! when a column it needs is absent. Type mismatches and impossible dates
//! are hard errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};
use crate::models::{Column, ColumnData, DataType, Dataset};

/// Name of the column built by [`derive_date`] unless told otherwise.
pub const DEFAULT_DATE_COLUMN: &str = "last_contact_date";

/// Three-letter month names, index + 1 is the month number.
const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Result of applying an operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The operation ran.
    Transformed(Dataset),
    /// A required column was absent; the dataset is returned as it came in.
    Unchanged { dataset: Dataset, warning: String },
}

impl Outcome {
    pub fn into_dataset(self) -> Dataset {
        match self {
            Outcome::Transformed(dataset) => dataset,
            Outcome::Unchanged { dataset, .. } => dataset,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Outcome::Transformed(_) => None,
            Outcome::Unchanged { warning, .. } => Some(warning),
        }
    }

    pub fn is_transformed(&self) -> bool {
        matches!(self, Outcome::Transformed(_))
    }
}

/// All available column operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    /// Replace every occurrence of one character in a text column
    SubstituteChar { column: String, from: char, to: char },

    /// Map a text column to boolean: `true_value` -> true, anything else -> false
    MapToBoolean { column: String, true_value: String },

    /// Build a date column from a day number and a month name, with a fixed year
    DeriveDate {
        day_column: String,
        month_column: String,
        year: i32,
        #[serde(default = "default_date_column")]
        target: String,
    },
}

fn default_date_column() -> String {
    DEFAULT_DATE_COLUMN.to_string()
}

impl Operation {
    /// Apply this operation to a dataset
    pub fn apply(&self, dataset: Dataset) -> TransformResult<Outcome> {
        match self {
            Operation::SubstituteChar { column, from, to } => {
                substitute_char(dataset, column, *from, *to)
            }
            Operation::MapToBoolean { column, true_value } => {
                map_string_to_boolean(dataset, column, true_value)
            }
            Operation::DeriveDate {
                day_column,
                month_column,
                year,
                target,
            } => derive_date(dataset, day_column, month_column, *year, target),
        }
    }

    /// One-line human readable summary
    pub fn describe(&self) -> String {
        match self {
            Operation::SubstituteChar { column, from, to } => {
                format!("{}: replace '{}' with '{}'", column, from, to)
            }
            Operation::MapToBoolean { column, true_value } => {
                format!("{}: '{}' -> true, otherwise false", column, true_value)
            }
            Operation::DeriveDate {
                day_column,
                month_column,
                year,
                target,
            } => format!(
                "{}: {}-<{}>-<{}>, drops {} and {}",
                target, year, month_column, day_column, month_column, day_column
            ),
        }
    }
}

fn text_values<'a>(
    dataset: &'a Dataset,
    column: &str,
) -> TransformResult<Option<&'a [Option<String>]>> {
    let Some(col) = dataset.column(column) else {
        return Ok(None);
    };
    col.as_text()
        .map(Some)
        .ok_or_else(|| TransformError::TypeMismatch {
            column: column.to_string(),
            expected: DataType::Text,
            actual: col.data_type(),
        })
}

/// Replace `from` with `to` in every row of `column` that contains `from`.
///
/// Rows without `from` and missing cells are kept as they are.
pub fn substitute_char(
    mut dataset: Dataset,
    column: &str,
    from: char,
    to: char,
) -> TransformResult<Outcome> {
    let Some(values) = text_values(&dataset, column)? else {
        let warning = format!(
            "In substitute_char(): '{}' column not found in input dataset, nothing to clean.",
            column
        );
        return Ok(Outcome::Unchanged { dataset, warning });
    };

    let replaced: Vec<Option<String>> = values
        .iter()
        .map(|value| match value {
            Some(s) if s.contains(from) => Some(s.replace(from, to.encode_utf8(&mut [0; 4]))),
            other => other.clone(),
        })
        .collect();

    dataset.replace_column(column, ColumnData::Text(replaced))?;
    Ok(Outcome::Transformed(dataset))
}

/// Turn a text column into a boolean column by equality with `true_value`.
///
/// Missing cells map to `false`.
pub fn map_string_to_boolean(
    mut dataset: Dataset,
    column: &str,
    true_value: &str,
) -> TransformResult<Outcome> {
    let Some(values) = text_values(&dataset, column)? else {
        let warning = format!(
            "In map_string_to_boolean(): '{}' column not found in input dataset, nothing to clean.",
            column
        );
        return Ok(Outcome::Unchanged { dataset, warning });
    };

    let flags: Vec<bool> = values
        .iter()
        .map(|value| value.as_deref() == Some(true_value))
        .collect();

    dataset.replace_column(column, ColumnData::Boolean(flags))?;
    Ok(Outcome::Transformed(dataset))
}

/// Month number (1-12) of a three-letter lowercase month name.
pub fn month_number(name: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

/// Build `target` as `year-month-day` from a month-name column and a day
/// column, then drop both source columns.
///
/// Dates are strict: a day that does not exist in its month is an error.
pub fn derive_date(
    mut dataset: Dataset,
    day_column: &str,
    month_column: &str,
    year: i32,
    target: &str,
) -> TransformResult<Outcome> {
    let (Some(day_col), Some(month_col)) =
        (dataset.column(day_column), dataset.column(month_column))
    else {
        let warning = format!(
            "In derive_date(): required columns '{}' or '{}' not found in input dataset, \
             nothing to clean.",
            day_column, month_column
        );
        return Ok(Outcome::Unchanged { dataset, warning });
    };

    let days = day_col.as_integer().ok_or_else(|| TransformError::TypeMismatch {
        column: day_column.to_string(),
        expected: DataType::Integer,
        actual: day_col.data_type(),
    })?;
    let months = month_col.as_text().ok_or_else(|| TransformError::TypeMismatch {
        column: month_column.to_string(),
        expected: DataType::Text,
        actual: month_col.data_type(),
    })?;

    let dates = days
        .iter()
        .zip(months)
        .enumerate()
        .map(|(row, (&day, month))| {
            let name = month.as_deref().ok_or_else(|| TransformError::MissingValue {
                row,
                column: month_column.to_string(),
            })?;
            let month = month_number(name).ok_or_else(|| TransformError::UnknownMonth {
                row,
                value: name.to_string(),
            })?;
            u32::try_from(day)
                .ok()
                .and_then(|d| NaiveDate::from_ymd_opt(year, month, d))
                .ok_or(TransformError::InvalidDate {
                    row,
                    year,
                    month,
                    day,
                })
        })
        .collect::<TransformResult<Vec<_>>>()?;

    dataset.drop_columns(&[month_column, day_column])?;
    dataset.push_column(Column::new(target, ColumnData::Date(dates)))?;
    Ok(Outcome::Transformed(dataset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clients() -> Dataset {
        Dataset::new(vec![
            Column::new("client_id", ColumnData::Integer(vec![1, 2, 3])),
            Column::new("job", ColumnData::text(&["admin.", "blue-collar", "technician."])),
            Column::new("credit_default", ColumnData::text(&["yes", "no", ""])),
        ])
        .unwrap()
    }

    fn contacts(months: &[&str], days: Vec<i64>) -> Dataset {
        Dataset::new(vec![
            Column::new("client_id", ColumnData::Integer((0..days.len() as i64).collect())),
            Column::new("month", ColumnData::text(months)),
            Column::new("day", ColumnData::Integer(days)),
        ])
        .unwrap()
    }

    #[test]
    fn test_substitute_only_matching_rows() {
        let out = substitute_char(clients(), "job", '.', '_').unwrap();
        assert!(out.is_transformed());
        let ds = out.into_dataset();
        let job = ds.column("job").unwrap().as_text().unwrap();
        assert_eq!(job[0].as_deref(), Some("admin_"));
        assert_eq!(job[1].as_deref(), Some("blue-collar"));
        assert_eq!(job[2].as_deref(), Some("technician_"));
    }

    #[test]
    fn test_substitute_leaves_other_columns() {
        let before = clients();
        let after = substitute_char(before.clone(), "job", '.', '_')
            .unwrap()
            .into_dataset();
        assert_eq!(after.column("client_id"), before.column("client_id"));
        assert_eq!(after.column("credit_default"), before.column("credit_default"));
        assert_eq!(after.row_count(), before.row_count());
    }

    #[test]
    fn test_substitute_is_idempotent() {
        let once = substitute_char(clients(), "job", '.', '_').unwrap().into_dataset();
        let twice = substitute_char(once.clone(), "job", '.', '_')
            .unwrap()
            .into_dataset();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_substitute_replaces_every_occurrence() {
        let ds = Dataset::new(vec![Column::new(
            "education",
            ColumnData::text(&["basic.9y.x", ""]),
        )])
        .unwrap();
        let ds = substitute_char(ds, "education", '.', '_').unwrap().into_dataset();
        let values = ds.column("education").unwrap().as_text().unwrap();
        assert_eq!(values[0].as_deref(), Some("basic_9y_x"));
        assert_eq!(values[1], None);
    }

    #[test]
    fn test_substitute_missing_column_warns() {
        let before = clients();
        let out = substitute_char(before.clone(), "education", '.', '_').unwrap();
        assert!(!out.is_transformed());
        assert!(out.warning().unwrap().contains("'education'"));
        assert_eq!(out.into_dataset(), before);
    }

    #[test]
    fn test_substitute_on_integer_column_fails() {
        let err = substitute_char(clients(), "client_id", '.', '_').unwrap_err();
        assert_eq!(
            err,
            TransformError::TypeMismatch {
                column: "client_id".into(),
                expected: DataType::Text,
                actual: DataType::Integer,
            }
        );
    }

    #[test]
    fn test_map_to_boolean() {
        let ds = map_string_to_boolean(clients(), "credit_default", "yes")
            .unwrap()
            .into_dataset();
        let col = ds.column("credit_default").unwrap();
        assert_eq!(col.data_type(), DataType::Boolean);
        assert_eq!(col.as_boolean().unwrap(), &[true, false, false]);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_names(), vec!["client_id", "job", "credit_default"]);
    }

    #[test]
    fn test_map_to_boolean_is_exact_match() {
        let ds = Dataset::new(vec![Column::new(
            "outcome",
            ColumnData::text(&["success", "Success", "successful", "failure"]),
        )])
        .unwrap();
        let ds = map_string_to_boolean(ds, "outcome", "success")
            .unwrap()
            .into_dataset();
        assert_eq!(
            ds.column("outcome").unwrap().as_boolean().unwrap(),
            &[true, false, false, false]
        );
    }

    #[test]
    fn test_map_to_boolean_missing_column_warns() {
        let out = map_string_to_boolean(clients(), "mortgage", "yes").unwrap();
        assert!(out.warning().unwrap().contains("'mortgage'"));
        assert_eq!(out.into_dataset(), clients());
    }

    #[test]
    fn test_map_to_boolean_twice_fails() {
        let mapped = map_string_to_boolean(clients(), "credit_default", "yes")
            .unwrap()
            .into_dataset();
        let err = map_string_to_boolean(mapped, "credit_default", "yes").unwrap_err();
        assert!(matches!(
            err,
            TransformError::TypeMismatch {
                actual: DataType::Boolean,
                ..
            }
        ));
    }

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("jan"), Some(1));
        assert_eq!(month_number("may"), Some(5));
        assert_eq!(month_number("dec"), Some(12));
        assert_eq!(month_number("Jan"), None);
        assert_eq!(month_number("january"), None);
    }

    #[test]
    fn test_derive_date() {
        let ds = derive_date(
            contacts(&["jan", "dec"], vec![15, 31]),
            "day",
            "month",
            2022,
            "last_contact_date",
        )
        .unwrap()
        .into_dataset();
        assert_eq!(ds.column_names(), vec!["client_id", "last_contact_date"]);
        assert_eq!(
            ds.column("last_contact_date").unwrap().as_date().unwrap(),
            &[date(2022, 1, 15), date(2022, 12, 31)]
        );
    }

    #[test]
    fn test_derive_date_unknown_month() {
        let err = derive_date(contacts(&["jan", "foo"], vec![1, 2]), "day", "month", 2022, "d")
            .unwrap_err();
        assert_eq!(
            err,
            TransformError::UnknownMonth {
                row: 1,
                value: "foo".into()
            }
        );
    }

    #[test]
    fn test_derive_date_rejects_feb_30() {
        let err = derive_date(contacts(&["feb"], vec![30]), "day", "month", 2022, "d").unwrap_err();
        assert_eq!(
            err,
            TransformError::InvalidDate {
                row: 0,
                year: 2022,
                month: 2,
                day: 30
            }
        );
    }

    #[test]
    fn test_derive_date_rejects_negative_day() {
        let err = derive_date(contacts(&["mar"], vec![-1]), "day", "month", 2022, "d").unwrap_err();
        assert!(matches!(err, TransformError::InvalidDate { day: -1, .. }));
    }

    #[test]
    fn test_derive_date_missing_month_value() {
        let err = derive_date(contacts(&[""], vec![3]), "day", "month", 2022, "d").unwrap_err();
        assert_eq!(
            err,
            TransformError::MissingValue {
                row: 0,
                column: "month".into()
            }
        );
    }

    #[test]
    fn test_derive_date_missing_source_column_warns() {
        let mut ds = contacts(&["jan"], vec![1]);
        ds.drop_columns(&["day"]).unwrap();
        let out = derive_date(ds.clone(), "day", "month", 2022, "d").unwrap();
        assert!(out.warning().is_some());
        let unchanged = out.into_dataset();
        assert_eq!(unchanged, ds);
        assert!(unchanged.has_column("month"));
        assert!(!unchanged.has_column("d"));
    }

    #[test]
    fn test_operation_json_shape() {
        let op: Operation = serde_json::from_str(
            r#"{"type": "derive_date", "day_column": "day", "month_column": "month", "year": 2022}"#,
        )
        .unwrap();
        assert_eq!(
            op,
            Operation::DeriveDate {
                day_column: "day".into(),
                month_column: "month".into(),
                year: 2022,
                target: DEFAULT_DATE_COLUMN.into(),
            }
        );

        let op = Operation::SubstituteChar {
            column: "job".into(),
            from: '.',
            to: '_',
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["type"], "substitute_char");
        assert_eq!(json["from"], ".");
    }

    #[test]
    fn test_operation_apply_dispatch() {
        let op = Operation::MapToBoolean {
            column: "credit_default".into(),
            true_value: "yes".into(),
        };
        let ds = op.apply(clients()).unwrap().into_dataset();
        assert_eq!(ds.column("credit_default").unwrap().data_type(), DataType::Boolean);
    }
}
