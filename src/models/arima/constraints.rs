//! Parameter transforms that keep ARMA polynomials stationary and invertible.
//!
//! The optimizer searches over unconstrained reals. Each value is squashed into a
//! partial autocorrelation in (-1, 1) and the Durbin-Levinson recursion turns the
//! partial autocorrelations into polynomial coefficients, which are then stationary
//! by construction (Jones 1980, Monahan 1984).

/// Map unconstrained reals to AR coefficients of a stationary process.
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(unconstrained.len());
    for &x in unconstrained {
        let r = x / (1.0 + x * x).sqrt();
        let previous = phi.clone();
        let k = previous.len();
        for i in 0..k {
            phi[i] = previous[i] - r * previous[k - 1 - i];
        }
        phi.push(r);
    }
    phi
}

/// Map unconstrained reals to MA coefficients of an invertible process.
///
/// The MA polynomial is `1 + theta_1 B + ...`, the mirror of the AR convention.
pub fn constrain_invertible(unconstrained: &[f64]) -> Vec<f64> {
    constrain_stationary(unconstrained)
        .into_iter()
        .map(|c| -c)
        .collect()
}
