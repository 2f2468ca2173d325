//! Column schema for LDS tables.
//!
//! Each logical field maps to one or more accepted header texts. The first
//! alias is the canonical name used in error messages and for manually
//! entered rows. Headers are matched exactly (after trimming), once per load.

use crate::io::table::RawTable;

/// Logical columns of an LDS table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Consumption,
    PurchaseCost,
    Revenue,
    OpCostFixed,
    OpCostVariable,
    Type,
    Year,
}

impl Field {
    /// Schema order; also the value order of manually entered rows.
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Consumption,
        Field::PurchaseCost,
        Field::Revenue,
        Field::OpCostFixed,
        Field::OpCostVariable,
        Field::Type,
        Field::Year,
    ];

    /// Columns normalized to decimals.
    pub const NUMERIC: [Field; 5] = [
        Field::Consumption,
        Field::PurchaseCost,
        Field::Revenue,
        Field::OpCostFixed,
        Field::OpCostVariable,
    ];
}

#[derive(Debug, Clone)]
pub struct ColumnSchema {
    columns: Vec<(Field, Vec<String>)>,
}

impl ColumnSchema {
    /// Build a schema from `(field, aliases)` pairs. Every field must be present.
    pub fn new(columns: Vec<(Field, Vec<String>)>) -> Self {
        Self { columns }
    }

    pub fn aliases(&self, field: Field) -> &[String] {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, a)| a.as_slice())
            .unwrap_or(&[])
    }

    pub fn canonical(&self, field: Field) -> &str {
        self.aliases(field).first().map(String::as_str).unwrap_or("")
    }

    /// Column index for `field` in `table`, trying aliases in order.
    pub fn resolve(&self, table: &RawTable, field: Field) -> Option<usize> {
        self.aliases(field)
            .iter()
            .find_map(|alias| table.column_index(alias))
    }
}

impl Default for ColumnSchema {
    /// Czech production headers, with the English names accepted as aliases.
    fn default() -> Self {
        Self::new(
            Field::ALL
                .iter()
                .map(|&f| (f, vec![czech_header(f).to_string(), english_header(f).to_string()]))
                .collect(),
        )
    }
}

fn czech_header(field: Field) -> &'static str {
    match field {
        Field::Name => "Název lokální distribuční sítě",
        Field::Consumption => "Celková spotřeba (MWh)",
        Field::PurchaseCost => "Celkové náklady na nákup energie (EUR/CZK)",
        Field::Revenue => "Výnosy z prodeje energie (EUR/CZK)",
        Field::OpCostFixed => "Náklady na provoz LDS (fixní – EUR/CZK)",
        Field::OpCostVariable => "Náklady na provoz LDS (variabilní – EUR/CZK)",
        Field::Type => "Typ LDS",
        Field::Year => "Rok",
    }
}

fn english_header(field: Field) -> &'static str {
    match field {
        Field::Name => "Name",
        Field::Consumption => "Consumption",
        Field::PurchaseCost => "PurchaseCost",
        Field::Revenue => "Revenue",
        Field::OpCostFixed => "OpCostFixed",
        Field::OpCostVariable => "OpCostVariable",
        Field::Type => "Type",
        Field::Year => "Year",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_accepts_both_languages() {
        let schema = ColumnSchema::default();
        assert_eq!(schema.canonical(Field::Year), "Rok");

        let cz = RawTable::new(vec!["Rok".into()], vec![]);
        let en = RawTable::new(vec![" Year ".into()], vec![]);
        assert_eq!(schema.resolve(&cz, Field::Year), Some(0));
        assert_eq!(schema.resolve(&en, Field::Year), Some(0));
        assert_eq!(schema.resolve(&en, Field::Type), None);
    }
}
