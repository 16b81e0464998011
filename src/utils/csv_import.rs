//! CSV upload plumbing shared by the user and admission imports.

use std::collections::HashMap;
use std::io::Cursor;

use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::models::ErrorCode;
use crate::models::users::responses::ImportRowError;

pub const MAX_IMPORT_ROWS: usize = 1000;

/// File-level failures; these abort the import before any row is touched.
#[derive(Debug, PartialEq)]
pub enum ImportParseError {
    MissingColumn(String),
    ParseFailed(String),
    EmptyFile,
    TooManyRows(usize),
}

impl ImportParseError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingColumn(_) => ErrorCode::ImportFileMissingColumn,
            Self::ParseFailed(_) => ErrorCode::ImportFileParseFailed,
            Self::EmptyFile | Self::TooManyRows(_) => ErrorCode::ImportFileDataInvalid,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::MissingColumn(col) => format!("Missing required column: {col}"),
            Self::ParseFailed(msg) => msg.clone(),
            Self::EmptyFile => "The file contains no data rows".to_string(),
            Self::TooManyRows(n) => {
                format!("At most {MAX_IMPORT_ROWS} rows can be imported at once (got {n})")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CsvRow {
    /// Line number as seen in a spreadsheet, header being line 1.
    pub row_num: usize,
    values: Vec<String>,
}

#[derive(Debug)]
pub struct CsvTable {
    columns: HashMap<String, usize>,
    pub rows: Vec<CsvRow>,
    /// Records the reader could not decode; they are skipped.
    pub errors: Vec<ImportRowError>,
}

impl CsvTable {
    /// Trimmed cell value, empty when the column or cell is absent.
    pub fn get<'a>(&self, row: &'a CsvRow, column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|&i| row.values.get(i))
            .map(|v| v.trim())
            .unwrap_or("")
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len() + self.errors.len()
    }
}

/// Reads a headed CSV file. Header names are matched case-insensitively and
/// every name in `required` must be present.
pub fn parse_csv(data: &[u8], required: &[&str]) -> Result<CsvTable, ImportParseError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(data));

    let headers = rdr
        .headers()
        .map_err(|e| ImportParseError::ParseFailed(format!("Failed to read header: {e}")))?;
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect();

    if let Some(missing) = required.iter().find(|c| !columns.contains_key(**c)) {
        return Err(ImportParseError::MissingColumn(missing.to_string()));
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let row_num = idx + 2;
        match result {
            Ok(record) => {
                if record.iter().all(|v| v.trim().is_empty()) {
                    continue;
                }
                rows.push(CsvRow {
                    row_num,
                    values: record.iter().map(str::to_string).collect(),
                });
            }
            Err(e) => errors.push(ImportRowError::new(row_num, "", format!("Unreadable row: {e}"))),
        }
    }

    if rows.is_empty() && errors.is_empty() {
        return Err(ImportParseError::EmptyFile);
    }
    if rows.len() + errors.len() > MAX_IMPORT_ROWS {
        return Err(ImportParseError::TooManyRows(rows.len() + errors.len()));
    }

    Ok(CsvTable {
        columns,
        rows,
        errors,
    })
}

/// Collects the `file` field of a multipart body.
pub async fn read_file_from_multipart(
    payload: &mut Multipart,
    max_size: usize,
) -> Result<(Vec<u8>, String), String> {
    let mut file_bytes = Vec::new();
    let mut file_name = String::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| format!("Failed to read field: {e}"))?;

        if field.name() == Some("file") {
            if let Some(content_disposition) = field.content_disposition() {
                file_name = content_disposition
                    .get_filename()
                    .unwrap_or("upload.csv")
                    .to_string();
            }

            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|e| format!("Failed to read data: {e}"))?;
                if file_bytes.len() + data.len() > max_size {
                    return Err(format!("File exceeds the {max_size} byte limit"));
                }
                file_bytes.extend_from_slice(&data);
            }
        }
    }

    if file_bytes.is_empty() {
        return Err("No file field found".to_string());
    }

    Ok((file_bytes, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let data = b"\xEF\xBB\xBFUserName, Email ,ROLE\nalice,a@x.com,parent\n\n";
        let table = parse_csv(data, &["username", "email", "role"]).unwrap();
        assert_eq!(table.rows.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.row_num, 2);
        assert_eq!(table.get(row, "email"), "a@x.com");
        assert_eq!(table.get(row, "phone"), "");
    }

    #[test]
    fn test_missing_column_is_reported_first() {
        let err = parse_csv(b"username,email\nbob,b@x.com\n", &["username", "email", "password"])
            .unwrap_err();
        assert_eq!(err, ImportParseError::MissingColumn("password".to_string()));
        assert_eq!(err.error_code(), ErrorCode::ImportFileMissingColumn);
    }

    #[test]
    fn test_short_rows_read_as_blank() {
        let table = parse_csv(b"a,b,c\n1\n4,5,6\n", &["a", "b", "c"]).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.get(&table.rows[0], "c"), "");
        assert_eq!(table.get(&table.rows[1], "c"), "6");
        assert_eq!(table.rows[1].row_num, 3);
    }

    #[test]
    fn test_empty_and_oversized_files() {
        assert_eq!(parse_csv(b"a,b\n", &["a"]).unwrap_err(), ImportParseError::EmptyFile);
        let mut big = String::from("a\n");
        for i in 0..=MAX_IMPORT_ROWS {
            big.push_str(&format!("{i}\n"));
        }
        assert!(matches!(
            parse_csv(big.as_bytes(), &["a"]),
            Err(ImportParseError::TooManyRows(_))
        ));
    }
}
