//! Input/output helpers.
//!
//! - decimal normalization shared by the loaders (`numeric`)
//! - raw CSV / Excel / SQL table ingest (`table`)
//! - consumption-series ingest (`series`)
//! - result exports (CSV/XLSX/JSON) (`export`)
//! - client offer document (`offer`)

pub mod export;
pub mod numeric;
pub mod offer;
pub mod series;
pub mod table;

pub use export::*;
pub use numeric::*;
pub use offer::*;
pub use series::*;
pub use table::*;
