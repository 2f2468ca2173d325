//! Raw tabular ingest: CSV, Excel and SQL.
//!
//! Everything is read as text. Typing and validation happen downstream
//! (`io::series` for consumption data, `margin::validate` for LDS tables), so
//! the readers here only care about getting a header row plus string cells.
//!
//! Reads are blocking one-shot operations; any failure aborts the run.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use tracing::{debug, info};

use crate::error::AppError;

/// A header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers.iter().map(|h| clean_header(h)).collect();
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column whose header equals `name` exactly (after trimming).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = clean_header(name);
        self.headers.iter().position(|h| *h == name)
    }

    /// Cell text, or `""` for short rows.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Where an LDS table comes from.
#[derive(Debug, Clone)]
pub enum TableSource {
    File(PathBuf),
    Sql { url: String, query: String },
    /// Rows typed in by the user, already laid out under the schema headers.
    Manual(RawTable),
}

/// Pick the first usable source: file, then SQL, then manual rows.
pub fn resolve_source(
    file: Option<&Path>,
    db_url: Option<&str>,
    query: Option<&str>,
    manual: Option<RawTable>,
) -> Result<TableSource, AppError> {
    if let Some(path) = file {
        return Ok(TableSource::File(path.to_path_buf()));
    }
    if let (Some(url), Some(query)) = (db_url, query) {
        return Ok(TableSource::Sql {
            url: url.to_string(),
            query: query.to_string(),
        });
    }
    if let Some(table) = manual.filter(|t| !t.is_empty()) {
        return Ok(TableSource::Manual(table));
    }
    Err(AppError::SourceUnavailable(
        "supply an input file, a database URL with a query, or manual rows".to_string(),
    ))
}

/// Load a table from any source.
pub fn load_table(source: &TableSource) -> Result<RawTable, AppError> {
    let table = match source {
        TableSource::File(path) => {
            info!(path = %path.display(), "loading table from file");
            read_file(path)?
        }
        TableSource::Sql { url, query } => {
            info!("loading table from database");
            read_sql(url, query)?
        }
        TableSource::Manual(table) => {
            info!(rows = table.len(), "using manually entered rows");
            table.clone()
        }
    };
    debug!(columns = ?table.headers, rows = table.len(), "table loaded");
    Ok(table)
}

/// Read a CSV or Excel file, dispatching on the extension.
pub fn read_file(path: &Path) -> Result<RawTable, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => read_csv(path),
        "xlsx" | "xlsm" | "xls" | "ods" => read_excel(path),
        _ => Err(AppError::SourceUnavailable(format!(
            "unsupported file format '{}' (expected .csv, .xlsx or .xls)",
            path.display()
        ))),
    }
}

/// Read a delimited text file. The delimiter is sniffed from the header line.
pub fn read_csv(path: &Path) -> Result<RawTable, AppError> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::Io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    parse_csv(&content)
}

/// Parse delimited text already in memory.
pub fn parse_csv(content: &str) -> Result<RawTable, AppError> {
    let header_line = content.lines().next().unwrap_or("");
    let delimiter = sniff_delimiter(header_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Io(format!("Failed to read CSV headers: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| AppError::Io(format!("CSV parse error on line {}: {e}", idx + 2)))?;
        let row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.iter().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }

    Ok(RawTable::new(headers, rows))
}

/// Read the first worksheet of an Excel workbook.
pub fn read_excel(path: &Path) -> Result<RawTable, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::Io(format!("Failed to open workbook '{}': {e}", path.display())))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AppError::Io(format!("Workbook '{}' has no worksheets", path.display())))?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| AppError::Io(format!("Failed to read worksheet '{sheet}': {e}")))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| AppError::Io(format!("Worksheet '{sheet}' is empty")))?
        .iter()
        .map(cell_text)
        .collect();

    let rows = rows_iter
        .map(|r| r.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|r| !r.iter().all(|v| v.is_empty()))
        .collect();

    Ok(RawTable::new(headers, rows))
}

/// Run a query against a SQLite database and return every column as text.
///
/// `url` may be a plain path or carry a `sqlite://` / `sqlite:` prefix.
pub fn read_sql(url: &str, query: &str) -> Result<RawTable, AppError> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);

    let conn = Connection::open(path)
        .map_err(|e| AppError::Io(format!("Failed to open database '{path}': {e}")))?;
    let mut stmt = conn
        .prepare(query)
        .map_err(|e| AppError::Io(format!("Invalid query: {e}")))?;

    let headers: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let n_cols = headers.len();

    let mut out = Vec::new();
    let mut rows = stmt
        .query([])
        .map_err(|e| AppError::Io(format!("Query failed: {e}")))?;
    while let Some(row) = rows
        .next()
        .map_err(|e| AppError::Io(format!("Query failed: {e}")))?
    {
        let mut values = Vec::with_capacity(n_cols);
        for i in 0..n_cols {
            let value = row
                .get_ref(i)
                .map_err(|e| AppError::Io(format!("Failed to read column {i}: {e}")))?;
            values.push(sql_text(value));
        }
        out.push(values);
    }

    Ok(RawTable::new(headers, out))
}

fn sql_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).into_owned(),
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        other => other.to_string().trim().to_string(),
    }
}

/// Convert an Excel serial date (days since 1899-12-30) to a timestamp.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Pick `;`, tab or `,`, whichever occurs most in the header line.
///
/// Ties go to `;` since comma-decimal exports use it as the separator.
fn sniff_delimiter(header_line: &str) -> u8 {
    let count = |c: char| header_line.matches(c).count();
    let candidates = [(b';', count(';')), (b'\t', count('\t')), (b',', count(','))];
    candidates
        .iter()
        .filter(|(_, n)| *n > 0)
        .fold(None::<(u8, usize)>, |best, &(d, n)| match best {
            Some((_, bn)) if bn >= n => best,
            _ => Some((d, n)),
        })
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

fn clean_header(name: &str) -> String {
    // Excel-produced CSVs often carry a BOM on the first header.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn sniffs_semicolon_over_comma_decimals() {
        let t = parse_csv("Datum;Spotřeba MWh\n2025-01-01 00:00;1,5\n").unwrap();
        assert_eq!(t.headers, vec!["Datum", "Spotřeba MWh"]);
        assert_eq!(t.cell(0, 1), "1,5");
    }

    #[test]
    fn sniffs_comma_and_tab() {
        assert_eq!(sniff_delimiter("a,b,c"), b',');
        assert_eq!(sniff_delimiter("a\tb\tc"), b'\t');
        assert_eq!(sniff_delimiter("single"), b',');
        assert_eq!(sniff_delimiter("a;b,c"), b';');
    }

    #[test]
    fn strips_bom_and_skips_blank_rows() {
        let t = parse_csv("\u{feff}Name,Year\nA,2023\n,\nB,2024\n").unwrap();
        assert_eq!(t.column_index("Name"), Some(0));
        assert_eq!(t.len(), 2);
        assert_eq!(t.cell(1, 0), "B");
        assert_eq!(t.cell(5, 0), "");
    }

    #[test]
    fn unsupported_extension_is_source_error() {
        let err = read_file(Path::new("data.parquet")).unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
    }

    #[test]
    fn reads_csv_from_disk() {
        let mut f = Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(f, "x;y").unwrap();
        writeln!(f, "1;2").unwrap();
        let t = read_file(f.path()).unwrap();
        assert_eq!(t.rows, vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[test]
    fn reads_sqlite_query() {
        let db = Builder::new().suffix(".db").tempfile().unwrap();
        let conn = Connection::open(db.path()).unwrap();
        conn.execute_batch(
            "CREATE TABLE lds (name TEXT, revenue REAL, year INTEGER);
             INSERT INTO lds VALUES ('Alfa', 100.5, 2023), ('Beta', NULL, 2024);",
        )
        .unwrap();
        drop(conn);

        let url = format!("sqlite://{}", db.path().display());
        let t = read_sql(&url, "SELECT name, revenue, year FROM lds ORDER BY name").unwrap();
        assert_eq!(t.headers, vec!["name", "revenue", "year"]);
        assert_eq!(t.rows[0], vec!["Alfa", "100.5", "2023"]);
        assert_eq!(t.cell(1, 1), "");
    }

    #[test]
    fn source_resolution_prefers_file_then_sql() {
        let file = resolve_source(Some(Path::new("a.csv")), Some("db"), Some("q"), None).unwrap();
        assert!(matches!(file, TableSource::File(_)));

        let sql = resolve_source(None, Some("db"), Some("SELECT 1"), None).unwrap();
        assert!(matches!(sql, TableSource::Sql { .. }));

        // A URL without a query is not a usable source.
        let err = resolve_source(None, Some("db"), None, Some(RawTable::default())).unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
    }

    #[test]
    fn excel_serial_dates_convert() {
        let dt = excel_serial_to_datetime(45658.5).unwrap();
        assert_eq!(dt.to_string(), "2025-01-01 12:00:00");
    }
}
