//! Least squares solvers.
//!
//! Forecasting fits straight lines through monthly `(timestamp, value)` pairs.
//! Timestamps are millisecond epochs (~1e12), so a naive normal-equation solve
//! loses most of its precision to cancellation. We instead:
//!
//! - center and scale x to roughly `[-1, 1]`
//! - solve the two-column design with SVD
//! - map the coefficients back to the original x units
//!
//! The result is the ordinary least squares line
//! `slope = (nΣxy − ΣxΣy) / (nΣxx − (Σx)²)`, `intercept = (Σy − slope·Σx) / n`.

use nalgebra::{DMatrix, DVector};

use crate::domain::RegressionModel;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y = slope * x + intercept`.
///
/// Returns `None` when there are fewer than two points, when every x is the
/// same (zero variance), or when an input is not finite.
pub fn fit_line(points: &[(f64, f64)]) -> Option<RegressionModel> {
    let n = points.len();
    if n < 2 || points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return None;
    }

    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n as f64;
    let scale = points
        .iter()
        .map(|(x, _)| (x - mean_x).abs())
        .fold(0.0, f64::max);
    if scale == 0.0 {
        return None;
    }

    let design = DMatrix::from_fn(n, 2, |i, j| {
        if j == 0 { 1.0 } else { (points[i].0 - mean_x) / scale }
    });
    let y = DVector::from_iterator(n, points.iter().map(|(_, y)| *y));

    let beta = solve_least_squares(&design, &y)?;
    let slope = beta[1] / scale;
    let intercept = beta[0] - slope * mean_x;

    if slope.is_finite() && intercept.is_finite() {
        Some(RegressionModel { slope, intercept })
    } else {
        None
    }
}
