//! Client table: who was contacted.

use super::{Extractor, Table};
use crate::error::ValidationResult;
use crate::models::{DataType, Dataset};
use crate::transform::operations::Operation;
use crate::transform::plan::ExtractionPlan;
use crate::validation::{
    assert_boolean_mapping, assert_column_set, assert_column_type, assert_no_char,
    assert_row_count,
};

/// Output columns, in order.
pub const COLUMNS: [&str; 7] = [
    "client_id",
    "age",
    "job",
    "marital",
    "education",
    "credit_default",
    "mortgage",
];

/// Columns where `.` is replaced by `_`.
const CLEANED: [&str; 2] = ["job", "education"];

/// Yes/no columns turned into booleans.
const FLAGS: [&str; 2] = ["credit_default", "mortgage"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ClientExtractor;

impl Extractor for ClientExtractor {
    fn table(&self) -> Table {
        Table::Client
    }

    fn plan(&self) -> ExtractionPlan {
        let mut plan = ExtractionPlan::new(Table::Client.name(), &COLUMNS);
        for column in CLEANED {
            plan = plan.with_operation(Operation::SubstituteChar {
                column: column.to_string(),
                from: '.',
                to: '_',
            });
        }
        for column in FLAGS {
            plan = plan.with_operation(Operation::MapToBoolean {
                column: column.to_string(),
                true_value: "yes".to_string(),
            });
        }
        plan
    }

    fn check(&self, result: &Dataset, source: &Dataset) -> ValidationResult<()> {
        assert_row_count(result, source)?;

        assert_column_type(result, "client_id", DataType::Integer)?;
        assert_column_type(result, "age", DataType::Integer)?;
        assert_column_type(result, "marital", DataType::Text)?;

        for column in CLEANED {
            assert_no_char(result, column, '.')?;
        }
        for column in FLAGS {
            assert_boolean_mapping(result, source, column, "yes")?;
        }

        assert_column_set(result, &COLUMNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractError, ValidationError};
    use crate::extract::fixtures;
    use crate::models::{Column, ColumnData};
    use crate::transform::substitute_char;

    #[test]
    fn test_extract_clients() {
        let source = fixtures::source();
        let clients = ClientExtractor.extract(&source).unwrap();

        assert_eq!(clients.column_names(), COLUMNS.to_vec());
        assert_eq!(clients.row_count(), 5);

        let job = clients.column("job").unwrap().as_text().unwrap();
        assert_eq!(job[1].as_deref(), Some("admin_"));
        assert_eq!(job[2].as_deref(), Some("technician_"));
        assert_eq!(job[3].as_deref(), Some("blue-collar"));

        let education = clients.column("education").unwrap().as_text().unwrap();
        assert_eq!(education[0].as_deref(), Some("basic_4y"));
        assert_eq!(education[4], None);

        assert_eq!(
            clients.column("credit_default").unwrap().as_boolean().unwrap(),
            &[false, true, false, false, false]
        );
        assert_eq!(
            clients.column("mortgage").unwrap().as_boolean().unwrap(),
            &[true, false, true, true, false]
        );
    }

    fn three_rows() -> Dataset {
        Dataset::new(vec![
            Column::new("client_id", ColumnData::Integer(vec![10, 11, 12])),
            Column::new("age", ColumnData::Integer(vec![30, 45, 52])),
            Column::new("job", ColumnData::text(&["admin.", "blue-collar", "technician."])),
            Column::new("marital", ColumnData::text(&["single", "married", "married"])),
            Column::new(
                "education",
                ColumnData::text(&["basic.9y", "unknown", "professional.course"]),
            ),
            Column::new("credit_default", ColumnData::text(&["yes", "no", "yes"])),
            Column::new("mortgage", ColumnData::text(&["no", "no", "yes"])),
        ])
        .unwrap()
    }

    #[test]
    fn test_three_row_jobs() {
        let clients = ClientExtractor.extract(&three_rows()).unwrap();
        let job: Vec<_> = clients
            .column("job")
            .unwrap()
            .as_text()
            .unwrap()
            .iter()
            .map(|j| j.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(job, vec!["admin_", "blue-collar", "technician_"]);
        assert_eq!(
            clients.column("credit_default").unwrap().as_boolean().unwrap(),
            &[true, false, true]
        );

        // running the substitution again changes nothing
        let again = substitute_char(clients.clone(), "job", '.', '_')
            .unwrap()
            .into_dataset();
        assert_eq!(again, clients);
    }

    #[test]
    fn test_mapped_flag_rejected_as_original() {
        let clients = ClientExtractor.extract(&three_rows()).unwrap();
        assert!(assert_boolean_mapping(&clients, &three_rows(), "credit_default", "yes").is_ok());
        assert!(matches!(
            assert_boolean_mapping(&clients, &clients, "credit_default", "yes").unwrap_err(),
            ValidationError::WrongType { .. }
        ));
    }

    #[test]
    fn test_missing_source_column_fails() {
        let mut source = fixtures::source();
        source.drop_columns(&["education"]).unwrap();
        let err = ClientExtractor.extract(&source).unwrap_err();
        assert!(matches!(err, ExtractError::Transform(_)));
        assert!(err.to_string().contains("education"));
    }

    #[test]
    fn test_check_catches_unsubstituted_job() {
        let source = fixtures::source();
        let raw = source.select(&COLUMNS).unwrap();
        let err = ClientExtractor.check(&raw, &source).unwrap_err();
        // job still has dots before any transform runs
        assert!(matches!(err, ValidationError::ForbiddenChar { .. }));
    }

    #[test]
    fn test_source_not_mutated() {
        let source = fixtures::source();
        ClientExtractor.extract(&source).unwrap();
        assert_eq!(source, fixtures::source());
    }
}
