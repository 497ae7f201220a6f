//! Small dense linear algebra for model fitting
//!
//! Contains:
//! - Levinson-Durbin recursion for Yule-Walker autoregression
//! - Gaussian elimination with partial pivoting
//! - Ridge-stabilised ordinary least squares

use crate::{MathError, Result};

const DEGENERATE_VARIANCE: f64 = 1e-12;

/// Solve the Yule-Walker equations for an AR(`order`) model.
///
/// `autocov` must hold autocovariances for lags `0..=order`. A series with
/// (numerically) zero variance has no autoregressive structure and yields
/// all-zero coefficients.
pub fn levinson_durbin(autocov: &[f64], order: usize) -> Result<Vec<f64>> {
    if autocov.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "Levinson-Durbin of order {} needs {} autocovariances, have {}",
            order,
            order + 1,
            autocov.len()
        )));
    }

    let mut coeffs = vec![0.0; order];
    let mut error = autocov[0];
    if error.abs() <= DEGENERATE_VARIANCE {
        return Ok(coeffs);
    }

    for k in 0..order {
        let mut acc = autocov[k + 1];
        for j in 0..k {
            acc -= coeffs[j] * autocov[k - j];
        }
        let reflection = acc / error;

        let previous = coeffs.clone();
        coeffs[k] = reflection;
        for j in 0..k {
            coeffs[j] = previous[j] - reflection * previous[k - 1 - j];
        }

        error *= 1.0 - reflection * reflection;
        if error <= DEGENERATE_VARIANCE {
            break;
        }
    }

    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(MathError::CalculationError(
            "Levinson-Durbin produced non-finite coefficients".to_string(),
        ));
    }

    Ok(coeffs)
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting
pub fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    if a.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Expected a {}x{} system matrix",
            n, n
        )));
    }

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return Err(MathError::CalculationError(
            "System matrix is zero or non-finite".to_string(),
        ));
    }
    let tolerance = scale * 1e-13;

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() < tolerance {
            return Err(MathError::CalculationError(format!(
                "System matrix is singular at column {}",
                col
            )));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Ok(x)
}

/// Ordinary least squares with a small ridge penalty.
///
/// `design` holds one row of regressors per observation. The penalty is
/// `ridge * (1 + mean diagonal of XᵀX)`, so all-zero regressors resolve to
/// zero coefficients instead of a singular system.
pub fn least_squares(design: &[Vec<f64>], target: &[f64], ridge: f64) -> Result<Vec<f64>> {
    if design.len() != target.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but target has {} values",
            design.len(),
            target.len()
        )));
    }
    if ridge < 0.0 {
        return Err(MathError::InvalidInput(
            "Ridge penalty must not be negative".to_string(),
        ));
    }

    let k = design.first().map_or(0, Vec::len);
    if k == 0 {
        return Ok(Vec::new());
    }
    if design.len() < k {
        return Err(MathError::InsufficientData(format!(
            "Least squares with {} regressors needs at least {} observations, have {}",
            k,
            k,
            design.len()
        )));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y) in design.iter().zip(target) {
        if row.len() != k {
            return Err(MathError::InvalidInput(
                "Design rows must all have the same length".to_string(),
            ));
        }
        for i in 0..k {
            xty[i] += row[i] * y;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let mean_diagonal = (0..k).map(|i| xtx[i][i]).sum::<f64>() / k as f64;
    let penalty = ridge * (1.0 + mean_diagonal);
    for (i, row) in xtx.iter_mut().enumerate() {
        row[i] += penalty;
    }

    solve_linear_system(xtx, xty)
}
