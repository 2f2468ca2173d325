//! Manually entered LDS rows.
//!
//! Rows are kept as raw text in schema order and converted into a
//! [`RawTable`] on demand, so they go through exactly the same validation
//! as file and database input.

use crate::error::AppError;
use crate::io::table::RawTable;
use crate::margin::schema::{ColumnSchema, Field};

#[derive(Debug, Clone, Default)]
pub struct ManualEntryTable {
    rows: Vec<Vec<String>>,
}

impl ManualEntryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one row. Values are in [`Field::ALL`] order.
    pub fn append(&mut self, values: Vec<String>) -> Result<(), AppError> {
        if values.len() != Field::ALL.len() {
            return Err(AppError::Config(format!(
                "manual row needs {} values (name;consumption;purchase;revenue;fixed;variable;type;year), got {}",
                Field::ALL.len(),
                values.len()
            )));
        }
        self.rows.push(values.into_iter().map(|v| v.trim().to_string()).collect());
        Ok(())
    }

    /// Append a `;`-separated row, e.g. `Areál;1200;40000;100000;10000;5000;industrial;2024`.
    pub fn append_line(&mut self, line: &str) -> Result<(), AppError> {
        self.append(line.split(';').map(str::to_string).collect())
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as a table headed by the schema's canonical names.
    pub fn to_raw_table(&self, schema: &ColumnSchema) -> RawTable {
        let headers = Field::ALL
            .iter()
            .map(|&f| schema.canonical(f).to_string())
            .collect();
        RawTable::new(headers, self.rows.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::margin::validate::validate;

    #[test]
    fn manual_rows_validate_like_a_file() {
        let mut manual = ManualEntryTable::new();
        manual
            .append_line("Areál Jih; 1200 ; 40000;100000;10000;5000;industrial;2024")
            .unwrap();
        assert_eq!(manual.len(), 1);

        let schema = ColumnSchema::default();
        let records = validate(&manual.to_raw_table(&schema), &schema).unwrap();
        assert_eq!(records[0].name, "Areál Jih");
        assert!((records[0].consumption - 1200.0).abs() < 1e-12);
        assert_eq!(records[0].year, 2024);
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let mut manual = ManualEntryTable::new();
        let err = manual.append_line("A;1;2").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(manual.is_empty());
    }

    #[test]
    fn clear_discards_rows() {
        let mut manual = ManualEntryTable::new();
        manual.append_line("A;1;1;1;1;1;x;2024").unwrap();
        manual.clear();
        assert!(manual.is_empty());
    }
}
