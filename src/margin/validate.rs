//! LDS table validation.
//!
//! Checks the schema first (reporting every missing column at once), then
//! normalizes the numeric columns. Unlike the consumption loader, a single bad
//! value fails the whole table: margins built on a partially parsed table
//! would be silently wrong.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::domain::EntityRecord;
use crate::error::AppError;
use crate::io::numeric::{parse_decimal, parse_year};
use crate::io::table::RawTable;
use crate::margin::schema::{ColumnSchema, Field};

/// Validate a raw table into typed entity records.
///
/// Row numbers in `AppError::Parse` are 1-based data rows (header excluded).
pub fn validate(table: &RawTable, schema: &ColumnSchema) -> Result<Vec<EntityRecord>, AppError> {
    let mut index: HashMap<Field, usize> = HashMap::new();
    let mut missing = Vec::new();
    for field in Field::ALL {
        match schema.resolve(table, field) {
            Some(i) => {
                index.insert(field, i);
            }
            None => missing.push(schema.canonical(field).to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(AppError::schema(missing));
    }
    debug!(?index, "schema resolved");

    let col = |field: Field| index[&field];

    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let number = |field: Field| -> Result<f64, AppError> {
            let raw = table.cell(row, col(field));
            parse_decimal(raw).ok_or_else(|| AppError::Parse {
                column: table.headers[col(field)].clone(),
                row: row + 1,
                value: raw.to_string(),
            })
        };

        let mut values = [0.0; 5];
        for (slot, field) in values.iter_mut().zip(Field::NUMERIC) {
            *slot = number(field)?;
        }
        let [consumption, purchase_cost, revenue, op_cost_fixed, op_cost_variable] = values;

        let year_raw = table.cell(row, col(Field::Year));
        let year = parse_year(year_raw).ok_or_else(|| AppError::Parse {
            column: table.headers[col(Field::Year)].clone(),
            row: row + 1,
            value: year_raw.to_string(),
        })?;

        records.push(EntityRecord {
            name: table.cell(row, col(Field::Name)).trim().to_string(),
            consumption,
            purchase_cost,
            revenue,
            op_cost_fixed,
            op_cost_variable,
            entity_type: table.cell(row, col(Field::Type)).trim().to_string(),
            year,
        });
    }

    info!(records = records.len(), "LDS table validated");
    Ok(records)
}
