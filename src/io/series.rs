//! Consumption-series ingest.
//!
//! Turns an uploaded load diagram (CSV or Excel, two relevant columns) into a
//! clean `ConsumptionSeries`:
//!
//! - the timestamp and volume columns are resolved once from header aliases
//! - volumes accept comma decimals and grouped thousands
//! - bad rows are skipped and reported, never fatal
//!
//! Only a missing column or an unreadable file aborts the load. A file whose
//! rows are all invalid yields an empty series (and therefore zero
//! allocations downstream).

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::domain::{ConsumptionPoint, ConsumptionSeries};
use crate::error::AppError;
use crate::io::numeric::parse_decimal;
use crate::io::table::{RawTable, excel_serial_to_datetime, read_file};

/// Header keywords that identify the two series columns.
///
/// Matching is case-insensitive and by substring, so `"Datum a čas"` matches
/// the `čas` keyword and `"Spotřeba [MWh]"` matches `mwh`.
#[derive(Debug, Clone)]
pub struct SeriesColumns {
    pub timestamp: Vec<String>,
    pub volume: Vec<String>,
}

impl Default for SeriesColumns {
    fn default() -> Self {
        Self {
            timestamp: ["date", "čas", "datum", "time"].map(String::from).to_vec(),
            volume: ["mwh", "spotřeba", "consumption"].map(String::from).to_vec(),
        }
    }
}

/// A row that was dropped during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// 1-based line number (header is line 1).
    pub line: usize,
    pub message: String,
}

/// Ingest output: the series plus what was resolved and skipped on the way.
#[derive(Debug, Clone)]
pub struct SeriesLoad {
    pub series: ConsumptionSeries,
    pub timestamp_column: String,
    pub volume_column: String,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
    pub duplicates_dropped: usize,
}

/// Load a consumption series from a CSV/Excel file.
pub fn load_series(path: &Path, columns: &SeriesColumns) -> Result<SeriesLoad, AppError> {
    info!(path = %path.display(), "loading consumption series");
    let table = read_file(path)?;
    series_from_table(&table, columns)
}

/// Build a consumption series from an already-read table.
pub fn series_from_table(table: &RawTable, columns: &SeriesColumns) -> Result<SeriesLoad, AppError> {
    let ts_idx = find_column(&table.headers, &columns.timestamp, None);
    let vol_idx = find_column(&table.headers, &columns.volume, ts_idx);

    let (ts_idx, vol_idx) = match (ts_idx, vol_idx) {
        (Some(t), Some(v)) => (t, v),
        (t, v) => {
            let mut missing = Vec::new();
            if t.is_none() {
                missing.push(format!("timestamp ({})", columns.timestamp.join("/")));
            }
            if v.is_none() {
                missing.push(format!("volume ({})", columns.volume.join("/")));
            }
            return Err(AppError::Schema { missing });
        }
    };

    let mut points = Vec::with_capacity(table.len());
    let mut row_errors = Vec::new();

    for row in 0..table.len() {
        let line = row + 2;
        match parse_point(table.cell(row, ts_idx), table.cell(row, vol_idx)) {
            Ok(p) => points.push(p),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let unique: HashSet<NaiveDateTime> = points.iter().map(|p| p.timestamp).collect();
    let duplicates_dropped = points.len() - unique.len();
    if duplicates_dropped > 0 {
        warn!(duplicates_dropped, "repeated timestamps dropped (first occurrence kept)");
    }
    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), "consumption rows skipped");
    }

    let series = ConsumptionSeries::new(points);
    if series.is_empty() {
        warn!("no usable consumption rows; every allocation will be zero");
    }
    info!(periods = series.len(), total_mwh = series.total_mwh(), "consumption series ready");

    Ok(SeriesLoad {
        series,
        timestamp_column: table.headers[ts_idx].clone(),
        volume_column: table.headers[vol_idx].clone(),
        rows_read: table.len(),
        row_errors,
        duplicates_dropped,
    })
}

fn find_column(headers: &[String], keywords: &[String], skip: Option<usize>) -> Option<usize> {
    headers.iter().enumerate().position(|(i, h)| {
        let h = h.to_lowercase();
        Some(i) != skip && keywords.iter().any(|k| h.contains(&k.to_lowercase()))
    })
}

fn parse_point(ts: &str, volume: &str) -> Result<ConsumptionPoint, String> {
    if ts.trim().is_empty() {
        return Err("Missing timestamp.".to_string());
    }
    let timestamp = parse_timestamp(ts).ok_or_else(|| format!("Invalid timestamp '{ts}'."))?;

    if volume.trim().is_empty() {
        return Err("Missing volume.".to_string());
    }
    let volume_mwh = parse_decimal(volume).ok_or_else(|| format!("Invalid volume '{volume}'."))?;
    if volume_mwh < 0.0 {
        return Err(format!("Negative volume {volume_mwh}."));
    }

    Ok(ConsumptionPoint {
        timestamp,
        volume_mwh,
    })
}

/// Parse the timestamp layouts seen in metering exports.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const DATETIME_FMTS: [&str; 10] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%d.%m.%Y %H:%M:%S",
        "%d.%m.%Y %H:%M",
        "%d. %m. %Y %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%Y/%m/%d %H:%M",
    ];
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%d.%m.%Y", "%d/%m/%Y", "%Y/%m/%d"];

    let s = s.trim();
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    // Untyped Excel cells arrive as serial day numbers.
    s.parse::<f64>()
        .ok()
        .filter(|v| *v > 1.0)
        .and_then(excel_serial_to_datetime)
}
