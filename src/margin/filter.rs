//! Year and entity-type selection over validated records.

use std::collections::BTreeSet;

use crate::domain::EntityRecord;

/// Optional year and type restriction. An empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub year: Option<i32>,
    pub entity_type: Option<String>,
}

impl RecordFilter {
    /// Type comparison ignores case and surrounding whitespace.
    pub fn matches(&self, record: &EntityRecord) -> bool {
        let year_ok = self.year.is_none_or(|y| y == record.year);
        let type_ok = self
            .entity_type
            .as_deref()
            .is_none_or(|t| t.trim().eq_ignore_ascii_case(record.entity_type.trim()));
        year_ok && type_ok
    }

    pub fn apply(&self, records: &[EntityRecord]) -> Vec<EntityRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.entity_type.is_none()
    }
}

/// Years present in the table, ascending.
pub fn distinct_years(records: &[EntityRecord]) -> Vec<i32> {
    records
        .iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Entity types present in the table, sorted.
pub fn distinct_types(records: &[EntityRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.entity_type.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
