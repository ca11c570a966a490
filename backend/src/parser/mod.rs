//! Source CSV loader with encoding and delimiter auto-detection.
//!
//! Reads the raw bytes, decodes them, parses rows with the `csv` crate and
//! coerces every column to the type declared in a [`SourceSchema`]. Columns
//! the schema does not mention are kept as text.

use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};

use crate::error::{CsvError, CsvResult};
use crate::models::{Column, ColumnData, DataType, Dataset};

/// Declared types of the source columns
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSchema {
    columns: Vec<(String, DataType)>,
}

impl SourceSchema {
    pub fn new(columns: &[(&str, DataType)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(name, data_type)| (name.to_string(), *data_type))
                .collect(),
        }
    }

    /// The bank marketing contact export.
    pub fn bank_marketing() -> Self {
        Self::new(&[
            ("client_id", DataType::Integer),
            ("age", DataType::Integer),
            ("job", DataType::Text),
            ("marital", DataType::Text),
            ("education", DataType::Text),
            ("credit_default", DataType::Text),
            ("mortgage", DataType::Text),
            ("number_contacts", DataType::Integer),
            ("contact_duration", DataType::Integer),
            ("previous_campaign_contacts", DataType::Integer),
            ("previous_outcome", DataType::Text),
            ("campaign_outcome", DataType::Text),
            ("month", DataType::Text),
            ("day", DataType::Integer),
            ("cons_price_idx", DataType::Float),
            ("euribor_three_months", DataType::Float),
        ])
    }

    /// Declared type of a column; undeclared columns are text.
    pub fn type_of(&self, column: &str) -> DataType {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, data_type)| *data_type)
            .unwrap_or(DataType::Text)
    }

    pub fn columns(&self) -> &[(String, DataType)] {
        &self.columns
    }
}

impl Default for SourceSchema {
    fn default() -> Self {
        Self::bank_marketing()
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Typed dataset
    pub dataset: Dataset,
    /// Detected encoding
    pub encoding: String,
    /// Detected or configured delimiter
    pub delimiter: char,
    /// Column headers, as found in the file
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with the given encoding, dropping a UTF-8 byte order mark.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()),
        "iso-8859-1" | "latin-1" | "latin1" => {
            let (text, _, had_errors) = encoding_rs::ISO_8859_15.decode(bytes);
            if had_errors {
                return Err(CsvError::EncodingError(encoding.to_string()));
            }
            text.into_owned()
        }
        "windows-1252" | "cp1252" => {
            let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
            if had_errors {
                return Err(CsvError::EncodingError(encoding.to_string()));
            }
            text.into_owned()
        }
        // Unknown label: best effort
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    Ok(decoded
        .strip_prefix('\u{feff}')
        .map(str::to_string)
        .unwrap_or(decoded))
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into a typed dataset.
///
/// Blank lines are skipped and short rows are padded with empty cells. A row
/// with more cells than the header is an error.
pub fn parse_str(content: &str, delimiter: char, schema: &SourceSchema) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    if !delimiter.is_ascii() {
        return Err(CsvError::InvalidDelimiter(delimiter));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    let mut lines: Vec<usize> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(lines.len() + 2);
        if record.len() > headers.len() {
            return Err(CsvError::ExtraFields {
                line,
                expected: headers.len(),
                actual: record.len(),
            });
        }
        lines.push(line);
        for (i, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .iter()
        .zip(raw)
        .map(|(name, cells)| {
            coerce_column(name, schema.type_of(name), cells, &lines)
                .map(|data| Column::new(name.clone(), data))
        })
        .collect::<CsvResult<Vec<_>>>()?;

    Ok(ParseResult {
        dataset: Dataset::new(columns)?,
        encoding: "utf-8".to_string(),
        delimiter,
        headers,
    })
}

fn coerce_column(
    name: &str,
    data_type: DataType,
    cells: Vec<String>,
    lines: &[usize],
) -> CsvResult<ColumnData> {
    let invalid = |row: usize, value: &str| CsvError::InvalidValue {
        line: lines.get(row).copied().unwrap_or(row + 2),
        column: name.to_string(),
        value: value.to_string(),
        expected: data_type,
    };

    let data = match data_type {
        DataType::Text => ColumnData::text(&cells),
        DataType::Integer => ColumnData::Integer(
            cells
                .iter()
                .enumerate()
                .map(|(row, s)| s.parse::<i64>().map_err(|_| invalid(row, s)))
                .collect::<CsvResult<_>>()?,
        ),
        DataType::Float => ColumnData::Float(
            cells
                .iter()
                .enumerate()
                .map(|(row, s)| {
                    if s.is_empty() {
                        Ok(f64::NAN)
                    } else {
                        s.parse::<f64>().map_err(|_| invalid(row, s))
                    }
                })
                .collect::<CsvResult<_>>()?,
        ),
        DataType::Boolean => ColumnData::Boolean(
            cells
                .iter()
                .enumerate()
                .map(|(row, s)| match s.to_lowercase().as_str() {
                    "true" => Ok(true),
                    "false" => Ok(false),
                    _ => Err(invalid(row, s)),
                })
                .collect::<CsvResult<_>>()?,
        ),
        DataType::Date => ColumnData::Date(
            cells
                .iter()
                .enumerate()
                .map(|(row, s)| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| invalid(row, s))
                })
                .collect::<CsvResult<_>>()?,
        ),
    };
    Ok(data)
}

/// Parse CSV bytes with auto-detection of encoding and, unless given,
/// delimiter.
pub fn parse_bytes_auto(
    bytes: &[u8],
    delimiter: Option<char>,
    schema: &SourceSchema,
) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    let mut result = parse_str(&content, delimiter, schema)?;
    result.encoding = encoding;
    Ok(result)
}

/// Load a CSV file. A missing file is reported as [`CsvError::FileNotFound`].
pub fn parse_csv_file_auto<P: AsRef<Path>>(
    path: P,
    delimiter: Option<char>,
    schema: &SourceSchema,
) -> CsvResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CsvError::FileNotFound(path.to_path_buf()),
        _ => CsvError::IoError(e),
    })?;

    parse_bytes_auto(&bytes, delimiter, schema)
}
