//! Result exports (CSV, XLSX and JSON).
//!
//! All formats carry the same content; the format is picked from the file
//! extension. CSV and XLSX share one header and row layout per table, JSON
//! serializes the domain types directly.

use std::fs::File;
use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};
use serde::Serialize;
use tracing::info;

use crate::domain::{AllocationTable, MarginRecord, TypeAverage};
use crate::error::AppError;

const ALLOCATION_HEADER: [&str; 2] = ["product", "volume_mwh"];
const MARGIN_HEADER: [&str; 10] = [
    "name",
    "entity_type",
    "year",
    "consumption",
    "purchase_cost",
    "revenue",
    "op_cost_fixed",
    "op_cost_variable",
    "operating_cost",
    "margin",
];
const AVERAGE_HEADER: [&str; 3] = ["entity_type", "average_margin", "count"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "json" => Ok(ExportFormat::Json),
            _ => Err(AppError::Config(format!(
                "export '{}' must end in .csv, .xlsx or .json",
                path.display()
            ))),
        }
    }
}

/// One exported cell. Non-finite numbers are written as empty cells.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn csv_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) if v.is_finite() => v.to_string(),
            Cell::Number(_) => String::new(),
        }
    }
}

/// Write the allocation table (`product,volume_mwh`).
pub fn write_allocation(path: &Path, table: &AllocationTable) -> Result<(), AppError> {
    match ExportFormat::from_path(path)? {
        ExportFormat::Json => write_json(path, table)?,
        ExportFormat::Csv => write_csv(path, &ALLOCATION_HEADER, &allocation_rows(table))?,
        ExportFormat::Xlsx => write_xlsx(path, "allocation", &ALLOCATION_HEADER, &allocation_rows(table))?,
    }
    info!(path = %path.display(), "allocation exported");
    Ok(())
}

/// Write per-entity margins. Undefined margins are left empty in CSV and
/// XLSX and written as `null` in JSON.
pub fn write_margins(path: &Path, records: &[MarginRecord]) -> Result<(), AppError> {
    match ExportFormat::from_path(path)? {
        ExportFormat::Json => write_json(path, records)?,
        ExportFormat::Csv => write_csv(path, &MARGIN_HEADER, &margin_rows(records))?,
        ExportFormat::Xlsx => write_xlsx(path, "margins", &MARGIN_HEADER, &margin_rows(records))?,
    }
    info!(path = %path.display(), rows = records.len(), "margins exported");
    Ok(())
}

/// Write the average-margin-by-type table. A type with no defined margin
/// keeps its row with an empty average.
pub fn write_averages(path: &Path, averages: &[TypeAverage]) -> Result<(), AppError> {
    match ExportFormat::from_path(path)? {
        ExportFormat::Json => write_json(path, averages)?,
        ExportFormat::Csv => write_csv(path, &AVERAGE_HEADER, &average_rows(averages))?,
        ExportFormat::Xlsx => write_xlsx(path, "averages", &AVERAGE_HEADER, &average_rows(averages))?,
    }
    info!(path = %path.display(), "averages exported");
    Ok(())
}

fn allocation_rows(table: &AllocationTable) -> Vec<Vec<Cell>> {
    table
        .rows
        .iter()
        .map(|r| vec![Cell::Text(r.product.label().to_string()), Cell::Number(r.volume_mwh)])
        .collect()
}

fn margin_rows(records: &[MarginRecord]) -> Vec<Vec<Cell>> {
    records
        .iter()
        .map(|m| {
            let r = &m.record;
            vec![
                Cell::Text(r.name.clone()),
                Cell::Text(r.entity_type.clone()),
                Cell::Number(f64::from(r.year)),
                Cell::Number(r.consumption),
                Cell::Number(r.purchase_cost),
                Cell::Number(r.revenue),
                Cell::Number(r.op_cost_fixed),
                Cell::Number(r.op_cost_variable),
                Cell::Number(m.operating_cost),
                Cell::Number(m.margin),
            ]
        })
        .collect()
}

fn average_rows(averages: &[TypeAverage]) -> Vec<Vec<Cell>> {
    averages
        .iter()
        .map(|a| {
            vec![
                Cell::Text(a.entity_type.clone()),
                Cell::Number(a.average_margin),
                Cell::Number(a.count as f64),
            ]
        })
        .collect()
}

fn write_csv(path: &Path, header: &[&str], rows: &[Vec<Cell>]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::Io(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    writer
        .write_record(header)
        .map_err(|e| AppError::Io(format!("Failed to write export CSV header: {e}")))?;
    for row in rows {
        writer
            .write_record(row.iter().map(Cell::csv_text))
            .map_err(|e| AppError::Io(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::Io(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Single-sheet workbook: header in row 0, data from row 1.
fn write_xlsx(path: &Path, sheet: &str, header: &[&str], rows: &[Vec<Cell>]) -> Result<(), AppError> {
    let xlsx_err =
        |e: XlsxError| AppError::Io(format!("Failed to write export workbook '{}': {e}", path.display()));

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet).map_err(xlsx_err)?;

    for (col, name) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name).map_err(xlsx_err)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Text(s) => {
                    worksheet.write_string(r, c, s.as_str()).map_err(xlsx_err)?;
                }
                Cell::Number(v) if v.is_finite() => {
                    worksheet.write_number(r, c, *v).map_err(xlsx_err)?;
                }
                Cell::Number(_) => {}
            }
        }
    }

    workbook.save(path).map_err(xlsx_err)?;
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::Io(format!("Failed to create export JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| AppError::Io(format!("Failed to write export JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AllocationRow, EntityRecord, Product};
    use crate::io::table::read_file;
    use calamine::{Data, Reader, Xlsx, open_workbook};

    fn table() -> AllocationTable {
        AllocationTable {
            rows: Product::ALL
                .iter()
                .map(|&product| AllocationRow {
                    product,
                    volume_mwh: if product == Product::Cal { 8760.0 } else { 0.0 },
                })
                .collect(),
        }
    }

    #[test]
    fn allocation_csv_and_json_carry_the_same_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("alloc.csv");
        let json_path = dir.path().join("alloc.json");

        write_allocation(&csv_path, &table()).unwrap();
        write_allocation(&json_path, &table()).unwrap();

        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        let lines: Vec<&str> = csv_text.lines().collect();
        assert_eq!(lines[0], "product,volume_mwh");
        assert_eq!(lines[1], "CAL,8760");
        assert_eq!(lines.len(), 1 + Product::ALL.len());
        assert!(lines.last().unwrap().starts_with("SPOT,"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), Product::ALL.len());
        assert_eq!(rows[0]["product"], "CAL");
        assert_eq!(rows[0]["volume_mwh"], 8760.0);
        assert_eq!(rows[5]["product"], "M01");
    }

    #[test]
    fn undefined_margin_is_blank_in_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("margins.csv");
        let record = MarginRecord {
            record: EntityRecord {
                name: "Zero".to_string(),
                consumption: 1.0,
                purchase_cost: 1.0,
                revenue: 0.0,
                op_cost_fixed: 1.0,
                op_cost_variable: 1.0,
                entity_type: "industrial".to_string(),
                year: 2024,
            },
            operating_cost: 2.0,
            margin: f64::NAN,
        };
        write_margins(&path, &[record]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("Zero,industrial,2024,"));
        assert!(row.ends_with(",2,"));
    }

    #[test]
    fn allocation_xlsx_reads_back_like_csv() {
        let dir = tempfile::tempdir().unwrap();
        let xlsx_path = dir.path().join("alloc.xlsx");
        let csv_path = dir.path().join("alloc.csv");
        write_allocation(&xlsx_path, &table()).unwrap();
        write_allocation(&csv_path, &table()).unwrap();

        let from_xlsx = read_file(&xlsx_path).unwrap();
        let from_csv = read_file(&csv_path).unwrap();
        assert_eq!(from_xlsx.headers, vec!["product", "volume_mwh"]);
        assert_eq!(from_xlsx, from_csv);
        assert_eq!(from_xlsx.cell(0, 0), "CAL");
        assert_eq!(from_xlsx.cell(0, 1), "8760");
    }

    #[test]
    fn xlsx_sheet_is_named_after_the_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("averages.xlsx");
        let averages = vec![
            TypeAverage {
                entity_type: "commercial".to_string(),
                average_margin: f64::NAN,
                count: 0,
            },
            TypeAverage {
                entity_type: "industrial".to_string(),
                average_margin: 30.5,
                count: 2,
            },
        ];
        write_averages(&path, &averages).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["averages".to_string()]);
        let range = workbook.worksheet_range("averages").unwrap();
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("average_margin".to_string())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("commercial".to_string())));
        // No defined margin: the cell stays empty.
        assert!(matches!(range.get_value((1, 1)), None | Some(Data::Empty)));
        assert_eq!(range.get_value((2, 1)), Some(&Data::Float(30.5)));
        assert_eq!(range.get_value((2, 2)), Some(&Data::Float(2.0)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = ExportFormat::from_path(Path::new("out.ods")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(ExportFormat::from_path(Path::new("OUT.XLSX")).unwrap(), ExportFormat::Xlsx);
    }
}
