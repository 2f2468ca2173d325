//! Reporting: flattening the allocation into a product table, and formatted
//! terminal output.

pub mod format;

use crate::domain::{AllocationRow, AllocationTable, Product, TierAllocation};

/// Flatten a tier allocation into one row per product, in tier order.
pub fn assemble(allocation: &TierAllocation) -> AllocationTable {
    let rows = Product::ALL
        .iter()
        .map(|&product| {
            let volume_mwh = match product {
                Product::Cal => allocation.cal,
                Product::Quarter(q) => allocation.quarters[usize::from(q - 1)],
                Product::Month(m) => allocation.months[usize::from(m - 1)],
                Product::Spot => allocation.spot,
            };
            AllocationRow { product, volume_mwh }
        })
        .collect();

    AllocationTable { rows }
}
