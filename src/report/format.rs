//! Formatted terminal output for both pipelines.
//!
//! We keep formatting code in one place so:
//! - the allocation and margin code stays clean and testable
//! - output changes are localized

use crate::domain::{
    AllocationTable, MARGIN_FEATURES, MarginModel, MarginRecord, TierAllocation, TierStep, TypeAverage,
};
use crate::io::series::SeriesLoad;
use crate::margin::RecordFilter;

/// Dataset stats, per-tier decisions and the product table.
pub fn format_allocation_summary(load: &SeriesLoad, allocation: &TierAllocation, table: &AllocationTable) -> String {
    let mut out = String::new();

    out.push_str("=== desk - Forward Allocation ===\n");
    out.push_str(&format!(
        "Columns: timestamp='{}' volume='{}'\n",
        load.timestamp_column, load.volume_column
    ));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={} duplicates={}\n",
        load.rows_read,
        load.series.len(),
        load.row_errors.len(),
        load.duplicates_dropped
    ));
    match load.series.span() {
        Some((from, to)) => out.push_str(&format!("Range: {from} .. {to}\n")),
        None => out.push_str("Range: (empty series)\n"),
    }
    out.push_str(&format!("Total consumption: {:.3} MWh\n", load.series.total_mwh()));

    for e in load.row_errors.iter().take(5) {
        out.push_str(&format!("  (line {}) {}\n", e.line, e.message));
    }
    if load.row_errors.len() > 5 {
        out.push_str(&format!("  ... {} more skipped rows\n", load.row_errors.len() - 5));
    }

    out.push_str("\nTier decisions:\n");
    out.push_str(&format_steps(&allocation.steps));

    out.push_str("\nAllocation:\n");
    out.push_str(&format_product_table(table));
    out.push_str(&format!(
        "Forward: {:.3} MWh | SPOT: {:.3} MWh | Total: {:.3} MWh\n",
        table.forward_mwh(),
        allocation.spot,
        table.total_mwh()
    ));

    out
}

fn format_steps(steps: &[TierStep]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<6} {:>8} {:>12} {:>14} {:>10} {:<4}",
            "slot", "periods", "base_load", "candidate", "threshold", "buy"
        ),
    );
    push_line(
        &mut out,
        format!("{:-<6} {:-<8} {:-<12} {:-<14} {:-<10} {:-<4}", "", "", "", "", "", ""),
    );
    for s in steps {
        push_line(
            &mut out,
            format!(
                "{:<6} {:>8} {:>12.4} {:>14.3} {:>10.0} {:<4}",
                s.product.label(),
                s.periods,
                s.base_load,
                s.candidate,
                s.threshold,
                if s.accepted { "yes" } else { "no" }
            ),
        );
    }
    out
}

/// Product table, one row per slot.
pub fn format_product_table(table: &AllocationTable) -> String {
    let mut out = String::new();
    push_line(&mut out, format!("{:<8} {:>14}", "product", "volume_mwh"));
    push_line(&mut out, format!("{:-<8} {:-<14}", "", ""));
    for r in &table.rows {
        push_line(&mut out, format!("{:<8} {:>14.3}", r.product.label(), r.volume_mwh));
    }
    out
}

/// Header of the margin report: row counts, the values available for the
/// year and type filters, and the active filter.
pub fn format_margin_header(
    rows_loaded: usize,
    years: &[i32],
    types: &[String],
    filter: &RecordFilter,
    rows_used: usize,
) -> String {
    let mut out = String::new();
    out.push_str("=== desk - LDS Margins ===\n");
    out.push_str(&format!("Rows: loaded={rows_loaded} used={rows_used}\n"));
    let years: Vec<String> = years.iter().map(i32::to_string).collect();
    out.push_str(&format!("Years: {}\n", years.join(", ")));
    out.push_str(&format!("Types: {}\n", types.join(", ")));
    if filter.is_empty() {
        out.push_str("Filter: none\n");
    } else {
        let year = filter.year.map(|y| y.to_string()).unwrap_or_else(|| "all".to_string());
        let kind = filter.entity_type.as_deref().unwrap_or("all");
        out.push_str(&format!("Filter: year={year} type={kind}\n"));
    }
    out
}

/// Per-entity margin table. Undefined margins show as `n/a`.
pub fn format_margins(margins: &[MarginRecord]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<28} {:<14} {:>6} {:>14} {:>14} {:>10}",
            "name", "type", "year", "revenue", "op_cost", "margin_%"
        ),
    );
    push_line(
        &mut out,
        format!("{:-<28} {:-<14} {:-<6} {:-<14} {:-<14} {:-<10}", "", "", "", "", "", ""),
    );
    for m in margins {
        let r = &m.record;
        let margin = if m.is_defined() { format!("{:.2}", m.margin) } else { "n/a".to_string() };
        push_line(
            &mut out,
            format!(
                "{:<28} {:<14} {:>6} {:>14.2} {:>14.2} {:>10}",
                truncate(&r.name, 28),
                truncate(&r.entity_type, 14),
                r.year,
                r.revenue,
                m.operating_cost,
                margin
            ),
        );
    }
    out
}

pub fn format_averages(averages: &[TypeAverage]) -> String {
    let mut out = String::new();
    out.push_str("Average margin by type:\n");
    if averages.is_empty() {
        out.push_str("  (no records)\n");
        return out;
    }
    for a in averages {
        let average = if a.average_margin.is_finite() {
            format!("{:.2} %", a.average_margin)
        } else {
            "n/a".to_string()
        };
        out.push_str(&format!(
            "  {:<20} {:>10}  (n={})\n",
            truncate(&a.entity_type, 20),
            average,
            a.count
        ));
    }
    out
}

/// Model coefficients, plus the prediction when one was requested.
pub fn format_model(model: &MarginModel, prediction: Option<([f64; 4], f64)>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Margin model: n={} R^2={:.4}\n",
        model.n, model.r_squared
    ));
    out.push_str(&format!("- intercept       : {:.6}\n", model.intercept));
    for (name, b) in MARGIN_FEATURES.iter().zip(model.coefficients) {
        out.push_str(&format!("- {name:<16}: {b:.6e}\n"));
    }
    if let Some((inputs, y)) = prediction {
        out.push_str(&format!("Predicted margin for {}: {y:.2} %\n", fmt_vec(&inputs)));
    }
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x}")).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::allocate;
    use crate::domain::{ConsumptionPoint, ConsumptionSeries, EntityRecord};
    use crate::report::assemble;
    use chrono::NaiveDate;

    fn load_of(hours: usize, volume: f64) -> SeriesLoad {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let points = (0..hours)
            .map(|h| ConsumptionPoint {
                timestamp: start + chrono::Duration::hours(h as i64),
                volume_mwh: volume,
            })
            .collect();
        SeriesLoad {
            series: ConsumptionSeries::new(points),
            timestamp_column: "date".to_string(),
            volume_column: "MWh".to_string(),
            rows_read: hours,
            row_errors: vec![],
            duplicates_dropped: 0,
        }
    }

    #[test]
    fn allocation_summary_lists_every_slot() {
        let load = load_of(744, 2.0);
        let allocation = allocate(&load.series);
        let table = assemble(&allocation);
        let txt = format_allocation_summary(&load, &allocation, &table);

        assert!(txt.contains("Total consumption: 1488.000 MWh"));
        let cal = txt.lines().find(|l| l.starts_with("CAL ")).unwrap();
        assert!(cal.contains(" 744 ") && cal.ends_with("yes"), "{cal}");
        for label in ["CAL", "Q4", "M01", "M12", "SPOT"] {
            assert!(txt.contains(&format!("\n{label} ")), "missing {label}");
        }
        assert!(txt.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn margin_header_lists_filter_choices() {
        let types = vec!["commercial".to_string(), "industrial".to_string()];
        let txt = format_margin_header(7, &[2023, 2024], &types, &RecordFilter::default(), 7);
        assert!(txt.contains("Years: 2023, 2024\n"));
        assert!(txt.contains("Types: commercial, industrial\n"));
        assert!(txt.ends_with("Filter: none\n"));

        let filter = RecordFilter {
            year: Some(2024),
            entity_type: None,
        };
        let txt = format_margin_header(7, &[2023, 2024], &types, &filter, 4);
        assert!(txt.contains("Rows: loaded=7 used=4\n"));
        assert!(txt.ends_with("Filter: year=2024 type=all\n"));
    }

    #[test]
    fn undefined_average_prints_na() {
        let txt = format_averages(&[TypeAverage {
            entity_type: "commercial".to_string(),
            average_margin: f64::NAN,
            count: 0,
        }]);
        let row = txt.lines().nth(1).unwrap();
        assert!(row.contains("n/a"));
        assert!(row.ends_with("(n=0)"));
    }

    #[test]
    fn undefined_margin_prints_na() {
        let m = MarginRecord {
            record: EntityRecord {
                name: "A very long local distribution network name".to_string(),
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
        let txt = format_margins(&[m]);
        let row = txt.lines().nth(2).unwrap();
        assert!(row.starts_with("A very long local distribut."));
        assert!(row.ends_with("n/a"));
    }

    #[test]
    fn model_block_shows_prediction() {
        let model = MarginModel {
            intercept: 10.0,
            coefficients: [0.01, -0.05, 0.2, -0.3],
            n: 7,
            r_squared: 1.0,
        };
        let txt = format_model(&model, Some(([1000.0, 30.0, 4.0, 6.0], 17.5)));
        assert!(txt.starts_with("Margin model: n=7 R^2=1.0000"));
        assert!(txt.contains("Predicted margin for [1000, 30, 4, 6]: 17.50 %"));
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
