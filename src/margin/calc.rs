//! Margin computation and per-type aggregation.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::domain::{EntityRecord, MarginRecord, TypeAverage};

/// Derive operating cost and margin (%) for one record.
///
/// `margin = (revenue - (purchase_cost + operating_cost)) / revenue * 100`.
/// A zero revenue leaves the margin undefined (`NaN`).
pub fn compute_margin(record: &EntityRecord) -> MarginRecord {
    let operating_cost = record.op_cost_fixed + record.op_cost_variable;
    let margin = if record.revenue == 0.0 {
        warn!(name = %record.name, year = record.year, "zero revenue; margin undefined");
        f64::NAN
    } else {
        (record.revenue - (record.purchase_cost + operating_cost)) / record.revenue * 100.0
    };

    MarginRecord {
        record: record.clone(),
        operating_cost,
        margin,
    }
}

pub fn compute_margins(records: &[EntityRecord]) -> Vec<MarginRecord> {
    let out: Vec<MarginRecord> = records.iter().map(compute_margin).collect();
    debug!(
        records = out.len(),
        undefined = out.iter().filter(|m| !m.is_defined()).count(),
        "margins computed"
    );
    out
}

/// Mean margin per entity type, sorted by type.
///
/// Every type present in `records` gets a row. Undefined margins are left out
/// of both the sum and the count, so a type whose margins are all undefined
/// has `count == 0` and a `NaN` average.
pub fn average_by_type(records: &[MarginRecord]) -> Vec<TypeAverage> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for m in records {
        let entry = groups.entry(m.record.entity_type.as_str()).or_insert((0.0, 0));
        if m.is_defined() {
            entry.0 += m.margin;
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(entity_type, (sum, count))| {
            let average_margin = if count == 0 { f64::NAN } else { sum / count as f64 };
            TypeAverage {
                entity_type: entity_type.to_string(),
                average_margin,
                count,
            }
        })
        .collect()
}
