//! Domain models for the bankmark pipeline.
//!
//! This module contains the in-memory table representation used by every
//! stage of the pipeline:
//!
//! - [`DataType`] - Logical type of a column
//! - [`ColumnData`] - Typed column values
//! - [`Column`] - Named column
//! - [`Dataset`] - Ordered set of equally long columns

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};

// =============================================================================
// Data Type
// =============================================================================

/// Logical type of a column.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 64-bit signed integer.
    Integer,
    /// 64-bit float, NaN marks a missing cell.
    Float,
    /// String or missing.
    Text,
    /// Boolean.
    Boolean,
    /// Calendar date without time.
    Date,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Text => "text",
            DataType::Boolean => "boolean",
            DataType::Date => "date",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Column Data
// =============================================================================

/// Values of one column, stored by type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<Option<String>>),
    Boolean(Vec<bool>),
    Date(Vec<NaiveDate>),
}

impl ColumnData {
    pub fn data_type(&self) -> DataType {
        match self {
            ColumnData::Integer(_) => DataType::Integer,
            ColumnData::Float(_) => DataType::Float,
            ColumnData::Text(_) => DataType::Text,
            ColumnData::Boolean(_) => DataType::Boolean,
            ColumnData::Date(_) => DataType::Date,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Boolean(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Build a text column from string slices, empty strings become missing.
    pub fn text<S: AsRef<str>>(values: &[S]) -> Self {
        ColumnData::Text(
            values
                .iter()
                .map(|s| {
                    let s = s.as_ref();
                    (!s.is_empty()).then(|| s.to_string())
                })
                .collect(),
        )
    }
}

// =============================================================================
// Column
// =============================================================================

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Text values, if this is a text column.
    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&[i64]> {
        match &self.data {
            ColumnData::Integer(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<&[bool]> {
        match &self.data {
            ColumnData::Boolean(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&[NaiveDate]> {
        match &self.data {
            ColumnData::Date(v) => Some(v),
            _ => None,
        }
    }

    /// Render one cell the way it is written to CSV.
    ///
    /// Floats always carry a decimal point, NaN and missing text are empty.
    pub fn cell(&self, row: usize) -> Option<String> {
        let value = match &self.data {
            ColumnData::Integer(v) => v.get(row)?.to_string(),
            ColumnData::Float(v) => format_float(*v.get(row)?),
            ColumnData::Text(v) => v.get(row)?.clone().unwrap_or_default(),
            ColumnData::Boolean(v) => {
                if *v.get(row)? {
                    "True".to_string()
                } else {
                    "False".to_string()
                }
            }
            ColumnData::Date(v) => v.get(row)?.format("%Y-%m-%d").to_string(),
        };
        Some(value)
    }
}

fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// An ordered sequence of named columns sharing one row count.
///
/// Datasets are values: every transform returns a new dataset and never
/// touches the one it was derived from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset, rejecting duplicate names and ragged columns.
    pub fn new(columns: Vec<Column>) -> DatasetResult<Self> {
        let mut dataset = Self {
            columns: Vec::with_capacity(columns.len()),
        };
        for column in columns {
            dataset.push_column(column)?;
        }
        Ok(dataset)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// `(name, type)` pairs in column order.
    pub fn schema(&self) -> Vec<(String, DataType)> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.data_type()))
            .collect()
    }

    /// Copy the named columns, in the given order, into a new dataset.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> DatasetResult<Dataset> {
        let columns = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.column(name)
                    .cloned()
                    .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
            })
            .collect::<DatasetResult<Vec<_>>>()?;
        Dataset::new(columns)
    }

    /// Append a column at the end.
    pub fn push_column(&mut self, column: Column) -> DatasetResult<()> {
        if self.has_column(&column.name) {
            return Err(DatasetError::DuplicateColumn(column.name));
        }
        if let Some(first) = self.columns.first() {
            let actual = column.len();
            if first.len() != actual {
                return Err(DatasetError::LengthMismatch {
                    column: column.name,
                    expected: first.len(),
                    actual,
                });
            }
        }
        self.columns.push(column);
        Ok(())
    }

    /// Replace a column's values in place, keeping its position.
    ///
    /// The new data may have a different type but must have the same length.
    pub fn replace_column(&mut self, name: &str, data: ColumnData) -> DatasetResult<()> {
        let expected = self.row_count();
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))?;
        if data.len() != expected {
            return Err(DatasetError::LengthMismatch {
                column: name.to_string(),
                expected,
                actual: data.len(),
            });
        }
        column.data = data;
        Ok(())
    }

    /// Remove the named columns. Every name must exist.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> DatasetResult<()> {
        for name in names {
            let name = name.as_ref();
            if !self.has_column(name) {
                return Err(DatasetError::MissingColumn(name.to_string()));
            }
        }
        self.columns
            .retain(|c| !names.iter().any(|n| n.as_ref() == c.name));
        Ok(())
    }
}
