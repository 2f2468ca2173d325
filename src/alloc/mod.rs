//! Forward-product allocation of client consumption.
//!
//! Responsibilities:
//!
//! - split a consumption series into CAL / Q / M base-load tranches
//! - leave the remainder as SPOT
//!
//! Flattening the nested result into a product table lives in `report`.

pub mod tiers;

pub use tiers::*;
