//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of an uploaded load diagram
//! - deterministic output (helpful for golden tests)
//!
//! The series is split into `width` equal-count buckets and each column shows
//! the bucket maximum as `*`. The CAL base load, when given, is drawn as a
//! `-` line underneath.

use crate::domain::ConsumptionSeries;

/// Render the consumption profile, optionally with a flat base-load line.
pub fn render_consumption_plot(
    series: &ConsumptionSeries,
    base_load: Option<f64>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let columns = bucket_max(series, width);
    if columns.is_empty() {
        return "Plot: (empty series)\n".to_string();
    }

    let (y_min, y_max) = y_range(&columns, base_load).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; columns.len()]; height];

    if let Some(base) = base_load.filter(|b| *b > 0.0) {
        let y = map_y(base, y_min, y_max, height);
        for cell in grid[y].iter_mut() {
            *cell = '-';
        }
    }

    for (x, &v) in columns.iter().enumerate() {
        let y = map_y(v, y_min, y_max, height);
        grid[y][x] = '*';
    }

    let mut out = String::new();
    match series.span() {
        Some((from, to)) => out.push_str(&format!(
            "Plot: {} .. {} | MWh=[{y_min:.2}, {y_max:.2}]\n",
            from.date(),
            to.date()
        )),
        None => out.push_str(&format!("Plot: MWh=[{y_min:.2}, {y_max:.2}]\n")),
    }

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

/// Maximum volume of each of (at most) `width` consecutive buckets.
fn bucket_max(series: &ConsumptionSeries, width: usize) -> Vec<f64> {
    let values: Vec<f64> = series.points().iter().map(|p| p.volume_mwh).collect();
    if values.is_empty() {
        return Vec::new();
    }
    let n_cols = width.min(values.len());
    (0..n_cols)
        .map(|c| {
            let start = c * values.len() / n_cols;
            let end = ((c + 1) * values.len() / n_cols).max(start + 1);
            values[start..end].iter().copied().fold(f64::NEG_INFINITY, f64::max)
        })
        .collect()
}

fn y_range(columns: &[f64], base_load: Option<f64>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &v in columns.iter().chain(base_load.iter()) {
        min_y = min_y.min(v);
        max_y = max_y.max(v);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else if min_y.is_finite() {
        // Flat profile: centre it.
        Some((min_y - 0.5, min_y + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}
