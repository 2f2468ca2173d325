//! Tiered base-load allocation.
//!
//! The consumption series is peeled in a fixed order:
//!
//! 1. `CAL`: one flat volume across the whole series
//! 2. `Q1..Q4`: one flat volume per calendar quarter
//! 3. `M01..M12`: one flat volume per calendar month
//! 4. `SPOT`: whatever residual is left
//!
//! For each slot the flat (base-load) value is the minimum residual inside the
//! slot's partition, so the contracted volume never exceeds demand in any hour.
//! A slot is only bought when `base_load × periods` reaches its threshold;
//! otherwise the residual is left untouched for the finer tiers.
//!
//! Partitions pool years: a series spanning two Januaries puts both into `M01`.

use chrono::{Datelike, NaiveDateTime};
use tracing::debug;

use crate::domain::{ConsumptionSeries, Product, TierAllocation, TierStep};

/// Minimum annual candidate volume (MWh) for a CAL purchase.
pub const CAL_THRESHOLD_MWH: f64 = 1000.0;
/// Minimum quarterly candidate volume (MWh) for a Q purchase.
pub const QUARTER_THRESHOLD_MWH: f64 = 1000.0;
/// Minimum monthly candidate volume (MWh) for an M purchase.
pub const MONTH_THRESHOLD_MWH: f64 = 720.0;

/// Allocate a consumption series across CAL / Q / M / SPOT.
///
/// Never fails: an empty series yields zero for every slot.
pub fn allocate(series: &ConsumptionSeries) -> TierAllocation {
    let timestamps: Vec<NaiveDateTime> = series.points().iter().map(|p| p.timestamp).collect();
    let mut residual: Vec<f64> = series.points().iter().map(|p| p.volume_mwh).collect();

    let mut out = TierAllocation::default();

    let everything: Vec<usize> = (0..residual.len()).collect();
    let cal = flatten(Product::Cal, &everything, &mut residual, CAL_THRESHOLD_MWH);
    out.cal = cal.allocated_mwh();
    out.steps.push(cal);

    for q in 1..=4u8 {
        let idx = partition(&timestamps, |ts| quarter_of(ts) == q);
        let step = flatten(Product::Quarter(q), &idx, &mut residual, QUARTER_THRESHOLD_MWH);
        out.quarters[usize::from(q - 1)] = step.allocated_mwh();
        out.steps.push(step);
    }

    for m in 1..=12u8 {
        let idx = partition(&timestamps, |ts| ts.month() == u32::from(m));
        let step = flatten(Product::Month(m), &idx, &mut residual, MONTH_THRESHOLD_MWH);
        out.months[usize::from(m - 1)] = step.allocated_mwh();
        out.steps.push(step);
    }

    out.spot = residual.iter().sum();
    debug!(spot_mwh = out.spot, "residual assigned to SPOT");

    out
}

/// Calendar quarter (1..=4) of a timestamp.
pub fn quarter_of(ts: &NaiveDateTime) -> u8 {
    // month0 is 0..=11, so the result is always 1..=4.
    (ts.month0() / 3 + 1) as u8
}

fn partition(timestamps: &[NaiveDateTime], keep: impl Fn(&NaiveDateTime) -> bool) -> Vec<usize> {
    timestamps
        .iter()
        .enumerate()
        .filter(|(_, ts)| keep(ts))
        .map(|(i, _)| i)
        .collect()
}

/// Evaluate one slot and, if accepted, lower the residual of its partition.
fn flatten(product: Product, idx: &[usize], residual: &mut [f64], threshold: f64) -> TierStep {
    if idx.is_empty() {
        debug!(product = %product, "empty partition");
        return TierStep {
            product,
            periods: 0,
            base_load: 0.0,
            candidate: 0.0,
            threshold,
            accepted: false,
        };
    }

    let base_load = idx.iter().map(|&i| residual[i]).fold(f64::INFINITY, f64::min);
    let candidate = base_load * idx.len() as f64;
    let accepted = candidate >= threshold;

    if accepted {
        for &i in idx {
            residual[i] -= base_load;
        }
    }

    debug!(
        product = %product,
        periods = idx.len(),
        base_load,
        candidate,
        threshold,
        accepted,
        "tier evaluated"
    );

    TierStep {
        product,
        periods: idx.len(),
        base_load,
        candidate,
        threshold,
        accepted,
    }
}
