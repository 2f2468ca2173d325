//! Command-line parsing for the energy desk.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the allocation and margin code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "desk", version, about = "Energy procurement desk: forward allocation and LDS margins")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Split a client's load diagram into CAL / Q / M / SPOT purchases.
    Allocate(AllocateArgs),
    /// Compute LDS margins, averages by type and the margin model.
    Margin(MarginArgs),
    /// Write a synthetic hourly load profile (demo input for `allocate`).
    Sample(SampleArgs),
}

#[derive(Debug, Args, Clone)]
pub struct AllocateArgs {
    /// Consumption file (CSV or Excel) with a timestamp and an MWh column.
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: PathBuf,

    /// Client name (required with --offer).
    #[arg(long)]
    pub client: Option<String>,

    /// Offer validity date (YYYY-MM-DD or DD.MM.YYYY).
    #[arg(long, value_parser = parse_date)]
    pub valid_until: Option<NaiveDate>,

    /// Write the offer document for the client.
    #[arg(long)]
    pub offer: bool,

    /// Directory for the offer document (overrides DESK_OUTPUT_DIR).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Export the allocation table (.csv, .xlsx or .json). Repeatable.
    #[arg(long, value_name = "FILE")]
    pub export: Vec<PathBuf>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct MarginArgs {
    /// LDS table (CSV or Excel).
    #[arg(short = 'i', long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// SQLite database URL (overrides DESK_DATABASE_URL).
    #[arg(long, value_name = "URL")]
    pub db_url: Option<String>,

    /// SQL query returning the LDS columns.
    #[arg(long, value_name = "SQL")]
    pub query: Option<String>,

    /// Manual row: `name;consumption;purchase;revenue;fixed;variable;type;year`. Repeatable.
    #[arg(long = "row", value_name = "VALUES")]
    pub rows: Vec<String>,

    /// Only use records of this year.
    #[arg(long)]
    pub year: Option<i32>,

    /// Only use records of this LDS type.
    #[arg(long = "type", value_name = "TYPE")]
    pub entity_type: Option<String>,

    /// Predict a margin for `consumption,purchase,fixed,variable`.
    #[arg(long, value_name = "C,P,F,V", value_parser = parse_prediction_inputs)]
    pub predict: Option<[f64; 4]>,

    /// Export per-entity margins (.csv, .xlsx or .json).
    #[arg(long, value_name = "FILE")]
    pub export_margins: Option<PathBuf>,

    /// Export average margin by type (.csv, .xlsx or .json).
    #[arg(long, value_name = "FILE")]
    pub export_averages: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV file.
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Calendar year to generate.
    #[arg(long, default_value_t = 2025)]
    pub year: i32,

    /// Average hourly base load (MWh).
    #[arg(long = "base", default_value_t = 2.0)]
    pub base_mwh: f64,
}

/// Accept ISO and Czech date layouts.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    ["%Y-%m-%d", "%d.%m.%Y", "%d. %m. %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| format!("invalid date '{s}' (expected YYYY-MM-DD or DD.MM.YYYY)"))
}

/// Parse `c,p,f,v` into the four model inputs.
pub fn parse_prediction_inputs(s: &str) -> Result<[f64; 4], String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid number in '{s}': {e}"))?;
    <[f64; 4]>::try_from(values)
        .map_err(|v| format!("expected 4 comma-separated values, got {}", v.len()))
}
