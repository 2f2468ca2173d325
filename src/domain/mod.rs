//! Domain types used throughout both pipelines.
//!
//! This module defines:
//!
//! - consumption input (`ConsumptionSeries`) and product slots (`Product`)
//! - allocation outputs (`TierAllocation`, `AllocationTable`)
//! - LDS financial rows and derived margins (`EntityRecord`, `MarginRecord`)
//! - run configuration derived from CLI flags

pub mod types;

pub use types::*;
