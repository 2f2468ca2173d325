//! LDS margin analysis.
//!
//! Pipeline: raw table -> [`validate`] -> [`compute_margins`] ->
//! [`average_by_type`] and [`train`]/[`predict`]. Inputs come from a file, a
//! SQL query or [`ManualEntryTable`], all as [`crate::io::RawTable`].

pub mod calc;
pub mod filter;
pub mod manual;
pub mod predict;
pub mod schema;
pub mod validate;

pub use calc::{average_by_type, compute_margin, compute_margins};
pub use filter::{RecordFilter, distinct_types, distinct_years};
pub use manual::ManualEntryTable;
pub use predict::{MIN_TRAINING_ROWS, predict, train};
pub use schema::{ColumnSchema, Field};
pub use validate::validate;
