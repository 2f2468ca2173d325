//! Synthetic hourly load profiles.
//!
//! Used by `desk sample` to produce demo input files, and by tests that need
//! a realistic year of consumption. Output is fully determined by the seed.

use std::f64::consts::PI;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate, Timelike};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::domain::{ConsumptionPoint, ConsumptionSeries, SampleConfig};
use crate::error::AppError;

/// Peak-to-base swing of the daily shape, as a fraction of base load.
const DAILY_AMPLITUDE: f64 = 0.35;
/// Winter-to-summer swing of the seasonal shape.
const SEASONAL_AMPLITUDE: f64 = 0.25;
/// Noise standard deviation, as a fraction of base load.
const NOISE_FRACTION: f64 = 0.05;
/// Weekend consumption relative to weekdays.
const WEEKEND_FACTOR: f64 = 0.8;

/// Generate one calendar year of hourly consumption.
pub fn generate_profile(config: &SampleConfig) -> Result<ConsumptionSeries, AppError> {
    if !(config.base_mwh.is_finite() && config.base_mwh > 0.0) {
        return Err(AppError::Config(format!(
            "base load must be a positive number, got {}",
            config.base_mwh
        )));
    }
    let start = NaiveDate::from_ymd_opt(config.year, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AppError::Config(format!("invalid year {}", config.year)))?;
    let end = NaiveDate::from_ymd_opt(config.year + 1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AppError::Config(format!("invalid year {}", config.year)))?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, NOISE_FRACTION * config.base_mwh)
        .map_err(|e| AppError::Config(format!("noise distribution error: {e}")))?;

    let hours = (end - start).num_hours();
    let mut points = Vec::with_capacity(hours as usize);
    for h in 0..hours {
        let ts = start + Duration::hours(h);

        // Daily shape peaks mid-afternoon, seasonal shape peaks mid-January.
        let daily = (2.0 * PI * (f64::from(ts.hour()) - 9.0) / 24.0).sin();
        let seasonal = (2.0 * PI * (f64::from(ts.ordinal0()) - 15.0) / 365.0).cos();
        let weekday = if ts.weekday().number_from_monday() >= 6 { WEEKEND_FACTOR } else { 1.0 };

        let level = config.base_mwh * weekday * (1.0 + DAILY_AMPLITUDE * daily + SEASONAL_AMPLITUDE * seasonal);
        let volume_mwh = (level + normal.sample(&mut rng)).max(0.0);

        points.push(ConsumptionPoint { timestamp: ts, volume_mwh });
    }

    let series = ConsumptionSeries::new(points);
    info!(
        year = config.year,
        seed = config.seed,
        periods = series.len(),
        total_mwh = series.total_mwh(),
        "synthetic profile generated"
    );
    Ok(series)
}

/// Write a series as `date;MWh` CSV with Czech-style decimals, the layout of
/// real metering exports.
pub fn write_profile_csv(path: &Path, series: &ConsumptionSeries) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .map_err(|e| AppError::Io(format!("Failed to create sample CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["Datum a čas", "Spotřeba [MWh]"])
        .map_err(|e| AppError::Io(format!("Failed to write sample CSV header: {e}")))?;
    for p in series.points() {
        let ts = p.timestamp.format("%d.%m.%Y %H:%M").to_string();
        let volume = format!("{:.4}", p.volume_mwh).replace('.', ",");
        writer
            .write_record([ts, volume])
            .map_err(|e| AppError::Io(format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::Io(format!("Failed to flush sample CSV: {e}")))?;

    info!(path = %path.display(), rows = series.len(), "sample profile written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::series::{SeriesColumns, load_series};

    fn config(seed: u64, year: i32) -> SampleConfig {
        SampleConfig {
            output: "unused.csv".into(),
            seed,
            year,
            base_mwh: 2.0,
        }
    }

    #[test]
    fn profile_covers_the_whole_year() {
        let series = generate_profile(&config(7, 2025)).unwrap();
        assert_eq!(series.len(), 8760);
        let leap = generate_profile(&config(7, 2024)).unwrap();
        assert_eq!(leap.len(), 8784);
        assert!(series.points().iter().all(|p| p.volume_mwh >= 0.0));
    }

    #[test]
    fn same_seed_same_profile() {
        let a = generate_profile(&config(42, 2025)).unwrap();
        let b = generate_profile(&config(42, 2025)).unwrap();
        let c = generate_profile(&config(43, 2025)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn non_positive_base_is_config_error() {
        let mut cfg = config(1, 2025);
        cfg.base_mwh = 0.0;
        assert!(matches!(generate_profile(&cfg), Err(AppError::Config(_))));
    }

    #[test]
    fn written_profile_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.csv");
        let series = generate_profile(&config(3, 2025)).unwrap();
        write_profile_csv(&path, &series).unwrap();

        let load = load_series(&path, &SeriesColumns::default()).unwrap();
        assert!(load.row_errors.is_empty());
        assert_eq!(load.series.len(), series.len());
        // Four decimals per row.
        let tolerance = series.len() as f64 * 5e-5 + 1e-9;
        assert!((load.series.total_mwh() - series.total_mwh()).abs() <= tolerance);
    }
}
