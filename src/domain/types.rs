//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory by the allocation and margin pipelines
//! - exported to JSON/CSV
//! - printed by the terminal reports

use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// One metered period (typically one hour) of client consumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsumptionPoint {
    pub timestamp: NaiveDateTime,
    pub volume_mwh: f64,
}

/// Time-ordered consumption with unique timestamps.
///
/// Construction sorts the points and drops repeated timestamps (first one
/// wins), so downstream code can rely on ascending, duplicate-free order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumptionSeries {
    points: Vec<ConsumptionPoint>,
}

impl ConsumptionSeries {
    pub fn new(mut points: Vec<ConsumptionPoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        points.dedup_by_key(|p| p.timestamp);
        Self { points }
    }

    pub fn points(&self) -> &[ConsumptionPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total consumption over the whole series (MWh).
    pub fn total_mwh(&self) -> f64 {
        self.points.iter().map(|p| p.volume_mwh).sum()
    }

    /// First and last timestamp, if any.
    pub fn span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.points.first()?.timestamp, self.points.last()?.timestamp))
    }
}

const QUARTER_LABELS: [&str; 4] = ["Q1", "Q2", "Q3", "Q4"];
const MONTH_LABELS: [&str; 12] = [
    "M01", "M02", "M03", "M04", "M05", "M06", "M07", "M08", "M09", "M10", "M11", "M12",
];

/// A purchasable product slot.
///
/// Quarters are numbered `1..=4`, months `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    Cal,
    Quarter(u8),
    Month(u8),
    Spot,
}

impl Product {
    /// All 18 product slots in tier order: CAL, Q1..Q4, M01..M12, SPOT.
    pub const ALL: [Product; 18] = [
        Product::Cal,
        Product::Quarter(1),
        Product::Quarter(2),
        Product::Quarter(3),
        Product::Quarter(4),
        Product::Month(1),
        Product::Month(2),
        Product::Month(3),
        Product::Month(4),
        Product::Month(5),
        Product::Month(6),
        Product::Month(7),
        Product::Month(8),
        Product::Month(9),
        Product::Month(10),
        Product::Month(11),
        Product::Month(12),
        Product::Spot,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Product::Cal => "CAL",
            Product::Quarter(q) => QUARTER_LABELS[usize::from(q.clamp(1, 4)) - 1],
            Product::Month(m) => MONTH_LABELS[usize::from(m.clamp(1, 12)) - 1],
            Product::Spot => "SPOT",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Product {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Diagnostics for one CAL/Q/M tier decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierStep {
    pub product: Product,
    /// Number of periods in the partition.
    pub periods: usize,
    /// Flat hourly volume (minimum residual of the partition).
    pub base_load: f64,
    /// `base_load × periods`.
    pub candidate: f64,
    pub threshold: f64,
    pub accepted: bool,
}

impl TierStep {
    /// Volume recorded for this slot (the candidate if accepted, else 0).
    pub fn allocated_mwh(&self) -> f64 {
        if self.accepted { self.candidate } else { 0.0 }
    }
}

/// Nested per-tier allocation result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TierAllocation {
    pub cal: f64,
    pub quarters: [f64; 4],
    pub months: [f64; 12],
    pub spot: f64,
    /// One entry per CAL/Q/M slot, in tier order.
    pub steps: Vec<TierStep>,
}

/// One row of the flattened allocation table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AllocationRow {
    pub product: Product,
    pub volume_mwh: f64,
}

/// Flattened allocation: always one row per [`Product::ALL`] slot, in tier order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AllocationTable {
    pub rows: Vec<AllocationRow>,
}

impl AllocationTable {
    pub fn total_mwh(&self) -> f64 {
        self.rows.iter().map(|r| r.volume_mwh).sum()
    }

    pub fn volume(&self, product: Product) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.product == product)
            .map(|r| r.volume_mwh)
    }

    /// Volume contracted through forward products (everything but SPOT).
    pub fn forward_mwh(&self) -> f64 {
        self.rows
            .iter()
            .filter(|r| r.product != Product::Spot)
            .map(|r| r.volume_mwh)
            .sum()
    }
}

/// One validated LDS row (one entity, one year).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRecord {
    pub name: String,
    pub consumption: f64,
    pub purchase_cost: f64,
    pub revenue: f64,
    pub op_cost_fixed: f64,
    pub op_cost_variable: f64,
    pub entity_type: String,
    pub year: i32,
}

/// An entity record with derived operating cost and margin (%).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginRecord {
    #[serde(flatten)]
    pub record: EntityRecord,
    pub operating_cost: f64,
    /// `NaN` when revenue is zero.
    pub margin: f64,
}

impl MarginRecord {
    pub fn is_defined(&self) -> bool {
        self.margin.is_finite()
    }
}

/// Mean margin of one entity type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAverage {
    pub entity_type: String,
    /// `NaN` when no record of this type has a defined margin.
    pub average_margin: f64,
    /// Number of records with a defined margin that went into the mean.
    pub count: usize,
}

/// Predictor order used by the margin model.
pub const MARGIN_FEATURES: [&str; 4] = [
    "consumption",
    "purchase_cost",
    "op_cost_fixed",
    "op_cost_variable",
];

/// Linear margin model: `margin ≈ intercept + Σ coefficients[i] * x[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginModel {
    pub intercept: f64,
    /// Ordered as [`MARGIN_FEATURES`].
    pub coefficients: [f64; 4],
    pub n: usize,
    pub r_squared: f64,
}

/// Settings for one `desk allocate` run.
#[derive(Debug, Clone)]
pub struct AllocConfig {
    pub input: PathBuf,
    pub client: Option<String>,
    pub valid_until: Option<NaiveDate>,
    pub offer: bool,
    pub output_dir: PathBuf,
    pub exports: Vec<PathBuf>,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

/// Settings for one `desk margin` run.
#[derive(Debug, Clone, Default)]
pub struct MarginConfig {
    pub input: Option<PathBuf>,
    pub db_url: Option<String>,
    pub query: Option<String>,
    /// Manually entered rows, `;`-separated in schema order.
    pub manual_rows: Vec<String>,
    pub year: Option<i32>,
    pub entity_type: Option<String>,
    /// Inputs for a single prediction, ordered as [`MARGIN_FEATURES`].
    pub predict: Option<[f64; 4]>,
    pub export_margins: Option<PathBuf>,
    pub export_averages: Option<PathBuf>,
}

/// Settings for synthetic profile generation.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub output: PathBuf,
    pub seed: u64,
    pub year: i32,
    /// Average hourly base load (MWh).
    pub base_mwh: f64,
}
