//! Output files: clearing the output directory and writing tables as CSV.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{OutputError, OutputResult};
use crate::logs::{log_info, log_info_indent, log_success};
use crate::models::Dataset;

/// Write a dataset as CSV: header row, no index column.
pub fn write_dataset<W: Write>(dataset: &Dataset, writer: W) -> OutputResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(dataset.column_names())?;
    for row in 0..dataset.row_count() {
        let record: Vec<String> = dataset
            .columns()
            .iter()
            .map(|c| c.cell(row).unwrap_or_default())
            .collect();
        csv_writer.write_record(&record)?;
    }

    csv_writer
        .flush()
        .map_err(|e| OutputError::Csv(csv::Error::from(e)))
}

/// Write a dataset to a file, creating parent directories as needed.
pub fn write_dataset_file(dataset: &Dataset, path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| OutputError::io(parent, e))?;
    }
    let file = fs::File::create(path).map_err(|e| OutputError::io(path, e))?;
    write_dataset(dataset, file)
}

/// Render a dataset to a CSV string.
pub fn to_csv_string(dataset: &Dataset) -> OutputResult<String> {
    let mut buf = Vec::new();
    write_dataset(dataset, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Delete every `*.csv` file in `dir`, creating `dir` if it does not exist.
///
/// Returns the deleted paths. Sub-directories and other files are left alone.
pub fn clear_output_files(dir: &Path) -> OutputResult<Vec<PathBuf>> {
    log_info(format!("Clearing output files in '{}'...", dir.display()));

    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| OutputError::io(dir, e))?;
    }

    let mut deleted = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| OutputError::io(dir, e))? {
        let path = entry.map_err(|e| OutputError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == "csv") {
            log_info_indent(
                format!(
                    "Deleting file {}...",
                    path.file_name().unwrap_or_default().to_string_lossy()
                ),
                1,
            );
            fs::remove_file(&path).map_err(|e| OutputError::io(&path, e))?;
            deleted.push(path);
        }
    }

    deleted.sort();
    log_success(format!("Done clearing output files in '{}'", dir.display()));
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, ColumnData};
    use chrono::NaiveDate;

    fn table() -> Dataset {
        Dataset::new(vec![
            Column::new("client_id", ColumnData::Integer(vec![1, 2])),
            Column::new("job", ColumnData::text(&["admin_", ""])),
            Column::new("note", ColumnData::text(&["a, b", "x"])),
            Column::new("mortgage", ColumnData::Boolean(vec![true, false])),
            Column::new("rate", ColumnData::Float(vec![4.857, 1.0])),
            Column::new(
                "last_contact_date",
                ColumnData::Date(vec![
                    NaiveDate::from_ymd_opt(2022, 5, 13).unwrap(),
                    NaiveDate::from_ymd_opt(2022, 11, 2).unwrap(),
                ]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_csv_layout() {
        let csv = to_csv_string(&table()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "client_id,job,note,mortgage,rate,last_contact_date");
        assert_eq!(lines[1], "1,admin_,\"a, b\",True,4.857,2022-05-13");
        assert_eq!(lines[2], "2,,x,False,1.0,2022-11-02");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_dataset_writes_header_only() {
        let ds = Dataset::new(vec![Column::new("client_id", ColumnData::Integer(vec![]))]).unwrap();
        assert_eq!(to_csv_string(&ds).unwrap(), "client_id\n");
    }

    #[test]
    fn test_write_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.csv");
        write_dataset_file(&table(), &path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("client_id,"));
    }

    #[test]
    fn test_clear_only_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("client.csv"), "x").unwrap();
        fs::write(dir.path().join("campaign.csv"), "x").unwrap();
        fs::write(dir.path().join("README.md"), "keep").unwrap();

        let deleted = clear_output_files(dir.path()).unwrap();

        assert_eq!(deleted.len(), 2);
        assert!(!dir.path().join("client.csv").exists());
        assert!(dir.path().join("README.md").exists());
    }

    #[test]
    fn test_clear_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        let deleted = clear_output_files(&out).unwrap();
        assert!(deleted.is_empty());
        assert!(out.is_dir());
    }
}
