//! Shared pipeline logic, kept free of printing.
//!
//! Keeping this in one place avoids duplicating the core workflows:
//! - allocation: load series -> allocate -> assemble table
//! - margins: resolve source -> load -> validate -> filter -> margins ->
//!   averages -> model
//!
//! The CLI handlers in `app` then only deal with presentation and exports.

use tracing::{info, warn};

use crate::alloc::allocate;
use crate::domain::{AllocConfig, AllocationTable, MarginConfig, MarginModel, MarginRecord, TierAllocation, TypeAverage};
use crate::error::AppError;
use crate::io::series::{SeriesColumns, SeriesLoad, load_series};
use crate::io::table::{load_table, resolve_source};
use crate::margin::{
    ColumnSchema, ManualEntryTable, RecordFilter, average_by_type, compute_margins, distinct_types, distinct_years,
    predict, train, validate,
};
use crate::report::assemble;

/// All computed outputs of a single allocation run.
#[derive(Debug, Clone)]
pub struct AllocationRun {
    pub load: SeriesLoad,
    pub allocation: TierAllocation,
    pub table: AllocationTable,
}

/// Execute the allocation pipeline.
pub fn run_allocation(config: &AllocConfig) -> Result<AllocationRun, AppError> {
    let load = load_series(&config.input, &SeriesColumns::default())?;
    let allocation = allocate(&load.series);
    let table = assemble(&allocation);

    info!(
        forward_mwh = table.forward_mwh(),
        spot_mwh = allocation.spot,
        "allocation complete"
    );

    Ok(AllocationRun {
        load,
        allocation,
        table,
    })
}

/// All computed outputs of a single margin run.
#[derive(Debug, Clone)]
pub struct MarginRun {
    pub rows_loaded: usize,
    /// Years present before filtering, ascending.
    pub years: Vec<i32>,
    /// Entity types present before filtering, sorted.
    pub types: Vec<String>,
    pub filter: RecordFilter,
    pub margins: Vec<MarginRecord>,
    pub averages: Vec<TypeAverage>,
    /// The trained model, or why it could not be trained.
    pub model: Result<MarginModel, AppError>,
    /// Requested inputs and the predicted margin.
    pub prediction: Option<([f64; 4], f64)>,
}

/// Execute the margin pipeline.
///
/// A model that cannot be trained is only fatal when a prediction was
/// requested; otherwise the margins and averages are still reported.
pub fn run_margin(config: &MarginConfig) -> Result<MarginRun, AppError> {
    let schema = ColumnSchema::default();

    let mut manual = ManualEntryTable::new();
    for line in &config.manual_rows {
        manual.append_line(line)?;
    }
    let manual_table = (!manual.is_empty()).then(|| manual.to_raw_table(&schema));

    let source = resolve_source(
        config.input.as_deref(),
        config.db_url.as_deref(),
        config.query.as_deref(),
        manual_table,
    )?;
    let table = load_table(&source)?;
    let records = validate(&table, &schema)?;
    let rows_loaded = records.len();
    let years = distinct_years(&records);
    let types = distinct_types(&records);

    let filter = RecordFilter {
        year: config.year,
        entity_type: config.entity_type.clone(),
    };
    let records = filter.apply(&records);
    if records.is_empty() {
        warn!(?filter, "no records left after filtering");
    }

    let margins = compute_margins(&records);
    let averages = average_by_type(&margins);
    let model = train(&margins);

    let prediction = match (config.predict, &model) {
        (Some(x), Ok(m)) => Some((x, predict(m, x[0], x[1], x[2], x[3]))),
        (Some(_), Err(e)) => return Err(e.clone()),
        (None, Err(e)) => {
            warn!(error = %e, "margin model not trained");
            None
        }
        (None, Ok(_)) => None,
    };

    Ok(MarginRun {
        rows_loaded,
        years,
        types,
        filter,
        margins,
        averages,
        model,
        prediction,
    })
}
