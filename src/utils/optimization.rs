//! Derivative-free minimisation used for conditional-sum-of-squares fitting.

/// Result of Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    /// The best point found.
    pub optimal_point: Vec<f64>,
    /// Objective value at the best point.
    pub optimal_value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the simplex converged before `max_iter`.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Convergence tolerance on the spread of objective values.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrink coefficient.
    pub sigma: f64,
    /// Initial simplex step.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.1,
        }
    }
}

impl NelderMeadConfig {
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Move from `from` through `towards` by factor `t`: `from + t * (towards - from)`.
fn lerp(from: &[f64], towards: &[f64], t: f64) -> Vec<f64> {
    from.iter()
        .zip(towards)
        .map(|(a, b)| a + t * (b - a))
        .collect()
}

/// Minimise `objective` starting from `initial`.
///
/// Non-finite objective values are treated as `+inf`, so the simplex moves away
/// from regions where the objective cannot be evaluated.
///
/// # Example
/// ```
/// use amara::utils::optimization::{nelder_mead, NelderMeadConfig};
///
/// let result = nelder_mead(
///     |x| (x[0] - 2.0).powi(2) + (x[1] + 1.0).powi(2),
///     &[0.0, 0.0],
///     NelderMeadConfig::default(),
/// );
///
/// assert!((result.optimal_point[0] - 2.0).abs() < 1e-3);
/// assert!((result.optimal_point[1] + 1.0).abs() < 1e-3);
/// ```
pub fn nelder_mead<F>(objective: F, initial: &[f64], config: NelderMeadConfig) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    if n == 0 {
        return NelderMeadResult {
            optimal_point: vec![],
            optimal_value: eval(&[]),
            iterations: 0,
            converged: true,
        };
    }

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += if initial[i].abs() > 1e-8 {
            config.initial_step * initial[i].abs()
        } else {
            config.initial_step
        };
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        if (values[n] - values[0]).abs() < config.tolerance {
            converged = true;
            break;
        }

        // centroid of every vertex but the worst
        let mut centroid = vec![0.0; n];
        for vertex in &simplex[..n] {
            for (c, x) in centroid.iter_mut().zip(vertex) {
                *c += x / n as f64;
            }
        }

        let reflected = lerp(&centroid, &simplex[n], -config.alpha);
        let reflected_value = eval(&reflected);

        if reflected_value < values[0] {
            let expanded = lerp(&centroid, &reflected, config.gamma);
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex[n] = expanded;
                values[n] = expanded_value;
            } else {
                simplex[n] = reflected;
                values[n] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[n - 1] {
            simplex[n] = reflected;
            values[n] = reflected_value;
            continue;
        }

        let (contracted, contracted_value) = if reflected_value < values[n] {
            let point = lerp(&centroid, &reflected, config.rho);
            let value = eval(&point);
            (point, value)
        } else {
            let point = lerp(&centroid, &simplex[n], config.rho);
            let value = eval(&point);
            (point, value)
        };

        if contracted_value < values[n].min(reflected_value) {
            simplex[n] = contracted;
            values[n] = contracted_value;
            continue;
        }

        for i in 1..=n {
            simplex[i] = lerp(&simplex[0], &simplex[i], config.sigma);
            values[i] = eval(&simplex[i]);
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);

    NelderMeadResult {
        optimal_point: simplex[best].clone(),
        optimal_value: values[best],
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn minimises_quadratic() {
        let result = nelder_mead(
            |x| (x[0] - 3.0).powi(2) + 2.0 * (x[1] - 1.0).powi(2),
            &[0.0, 0.0],
            NelderMeadConfig::default(),
        );
        assert!(result.converged);
        assert_relative_eq!(result.optimal_point[0], 3.0, epsilon = 1e-3);
        assert_relative_eq!(result.optimal_point[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn minimises_rosenbrock() {
        let result = nelder_mead(
            |x| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2),
            &[-1.0, 1.0],
            NelderMeadConfig::default().with_max_iter(5000).with_tolerance(1e-12),
        );
        assert_relative_eq!(result.optimal_point[0], 1.0, epsilon = 1e-2);
        assert_relative_eq!(result.optimal_point[1], 1.0, epsilon = 1e-2);
    }

    #[test]
    fn avoids_non_finite_regions() {
        let result = nelder_mead(
            |x| if x[0] < 0.0 { f64::NAN } else { (x[0] - 0.5).powi(2) },
            &[1.0],
            NelderMeadConfig::default(),
        );
        assert!(result.optimal_value.is_finite());
        assert_relative_eq!(result.optimal_point[0], 0.5, epsilon = 1e-3);
    }

    #[test]
    fn empty_point() {
        let result = nelder_mead(|_| 4.0, &[], NelderMeadConfig::default());
        assert!(result.optimal_point.is_empty());
        assert_eq!(result.optimal_value, 4.0);
    }
}
