//! Ordinary Least Squares regression with an intercept.
//!
//! Used for the exogenous part of ARIMAX models and for the Dickey-Fuller regression.

use crate::error::{AmaraError, Result};

/// Fitted OLS regression `y = intercept + X @ coefficients`.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// Intercept term.
    pub intercept: f64,
    /// One coefficient per regressor, in input order.
    pub coefficients: Vec<f64>,
    /// Standard errors: intercept first, then one per coefficient.
    pub standard_errors: Vec<f64>,
    /// Residual sum of squares.
    pub rss: f64,
    /// Number of observations used.
    pub n_obs: usize,
}

impl OLSResult {
    /// Predict for observation rows given as regressor columns.
    pub fn predict(&self, regressors: &[&[f64]]) -> Result<Vec<f64>> {
        if regressors.len() != self.coefficients.len() {
            return Err(AmaraError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: regressors.len(),
            });
        }
        let n = regressors.first().map(|c| c.len()).unwrap_or(0);
        if let Some(bad) = regressors.iter().find(|c| c.len() != n) {
            return Err(AmaraError::DimensionMismatch {
                expected: n,
                got: bad.len(),
            });
        }

        let mut predictions = vec![self.intercept; n];
        for (coef, column) in self.coefficients.iter().zip(regressors) {
            for (pred, x) in predictions.iter_mut().zip(column.iter()) {
                *pred += coef * x;
            }
        }
        Ok(predictions)
    }

    /// t statistic of the coefficient for regressor `i`.
    pub fn t_stat(&self, i: usize) -> f64 {
        let se = self.standard_errors.get(i + 1).copied().unwrap_or(f64::NAN);
        self.coefficients.get(i).copied().unwrap_or(f64::NAN) / se
    }

}

/// Fit `y = intercept + sum(beta_i * x_i)` by solving the normal equations.
///
/// # Arguments
/// * `y` - Target values (length n)
/// * `regressors` - Regressor columns, each of length n
pub fn ols_fit(y: &[f64], regressors: &[&[f64]]) -> Result<OLSResult> {
    let n = y.len();
    let k = regressors.len() + 1;

    if n < k {
        return Err(AmaraError::InsufficientData { needed: k, got: n });
    }
    if let Some(bad) = regressors.iter().find(|c| c.len() != n) {
        return Err(AmaraError::DimensionMismatch {
            expected: n,
            got: bad.len(),
        });
    }

    let row = |obs: usize, j: usize| if j == 0 { 1.0 } else { regressors[j - 1][obs] };

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for obs in 0..n {
        for i in 0..k {
            let xi = row(obs, i);
            xty[i] += xi * y[obs];
            for j in 0..=i {
                xtx[i][j] += xi * row(obs, j);
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
        // small ridge keeps near-collinear designs solvable
        xtx[i][i] += 1e-10;
    }

    let l = cholesky(&xtx).ok_or_else(|| {
        AmaraError::ComputationError("OLS normal equations are not positive definite".into())
    })?;
    let beta = cholesky_solve(&l, &xty);

    let rss: f64 = (0..n)
        .map(|obs| {
            let fitted: f64 = (0..k).map(|j| beta[j] * row(obs, j)).sum();
            (y[obs] - fitted).powi(2)
        })
        .sum();

    let sigma_sq = if n > k { rss / (n - k) as f64 } else { f64::NAN };
    let standard_errors = (0..k)
        .map(|j| {
            let mut unit = vec![0.0; k];
            unit[j] = 1.0;
            let column = cholesky_solve(&l, &unit);
            (sigma_sq * column[j]).sqrt()
        })
        .collect();

    Ok(OLSResult {
        intercept: beta[0],
        coefficients: beta[1..].to_vec(),
        standard_errors,
        rss,
        n_obs: n,
    })
}

/// Lower-triangular Cholesky factor of a symmetric positive definite matrix.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for p in 0..j {
                sum -= l[i][p] * l[j][p];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(l)
}

/// Solve `L L' x = b` by forward then backward substitution.
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    let mut z = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[i][j] * z[j]).sum();
        z[i] = (b[i] - sum) / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|j| l[j][i] * x[j]).sum();
        x[i] = (z[i] - sum) / l[i][i];
    }

    x
}
