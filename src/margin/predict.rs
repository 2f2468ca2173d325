//! Linear margin predictor.
//!
//! Ordinary least squares of margin (%) on consumption, purchase cost and
//! the two operating-cost components, with an intercept. Predictor columns
//! are standardized before solving and the coefficients transformed back,
//! so the rank test is not thrown off by the very different scales of MWh
//! and currency columns.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use crate::domain::{MARGIN_FEATURES, MarginModel, MarginRecord};
use crate::error::AppError;
use crate::math::ols::{r_squared, solve_least_squares};

/// Smallest training set: one row per coefficient (intercept + 4 predictors).
pub const MIN_TRAINING_ROWS: usize = MARGIN_FEATURES.len() + 1;

fn features(m: &MarginRecord) -> [f64; 4] {
    let r = &m.record;
    [r.consumption, r.purchase_cost, r.op_cost_fixed, r.op_cost_variable]
}

/// Fit the margin model on records with a defined margin.
///
/// Fails when there are fewer than [`MIN_TRAINING_ROWS`] rows, when any value
/// is not finite, or when the predictors are constant or collinear.
pub fn train(records: &[MarginRecord]) -> Result<MarginModel, AppError> {
    let n = records.len();
    if n < MIN_TRAINING_ROWS {
        return Err(AppError::Fitting(format!(
            "need at least {MIN_TRAINING_ROWS} records to fit the margin model, got {n}"
        )));
    }
    if let Some(bad) = records
        .iter()
        .find(|m| !m.margin.is_finite() || features(m).iter().any(|v| !v.is_finite()))
    {
        return Err(AppError::Fitting(format!(
            "record '{}' ({}) has an undefined margin or non-finite input",
            bad.record.name, bad.record.year
        )));
    }

    let rows: Vec<[f64; 4]> = records.iter().map(features).collect();
    let mut means = [0.0; 4];
    let mut scales = [0.0; 4];
    for j in 0..4 {
        let mean = rows.iter().map(|r| r[j]).sum::<f64>() / n as f64;
        let var = rows.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n as f64;
        let sd = var.sqrt();
        if sd <= f64::EPSILON * mean.abs().max(1.0) {
            return Err(AppError::Fitting(format!(
                "predictor '{}' is constant across the training set",
                MARGIN_FEATURES[j]
            )));
        }
        means[j] = mean;
        scales[j] = sd;
    }

    let x = DMatrix::from_fn(n, 5, |i, j| {
        if j == 0 {
            1.0
        } else {
            (rows[i][j - 1] - means[j - 1]) / scales[j - 1]
        }
    });
    let y = DVector::from_iterator(n, records.iter().map(|m| m.margin));

    let fit = solve_least_squares(&x, &y)
        .ok_or_else(|| AppError::Fitting("least squares solve failed".to_string()))?;
    if !fit.is_full_rank() {
        return Err(AppError::Fitting(format!(
            "predictors are collinear (rank {} of {})",
            fit.rank,
            fit.beta.len()
        )));
    }
    debug!(beta = ?fit.beta.as_slice(), "standardized coefficients");

    let y_hat = &x * &fit.beta;
    let mut coefficients = [0.0; 4];
    let mut intercept = fit.beta[0];
    for j in 0..4 {
        coefficients[j] = fit.beta[j + 1] / scales[j];
        intercept -= coefficients[j] * means[j];
    }

    let model = MarginModel {
        intercept,
        coefficients,
        n,
        r_squared: r_squared(&y, &y_hat),
    };
    info!(n, r_squared = model.r_squared, "margin model trained");
    Ok(model)
}

/// Predicted margin (%) for one set of inputs.
pub fn predict(
    model: &MarginModel,
    consumption: f64,
    purchase_cost: f64,
    op_cost_fixed: f64,
    op_cost_variable: f64,
) -> f64 {
    let x = [consumption, purchase_cost, op_cost_fixed, op_cost_variable];
    model.intercept
        + model
            .coefficients
            .iter()
            .zip(x)
            .map(|(b, v)| b * v)
            .sum::<f64>()
}
