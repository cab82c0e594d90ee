//! Gap filling for date-indexed numeric columns.

use chrono::NaiveDate;

use crate::utils::stats::mean;

/// Linearly interpolate NaN values, weighting by day distance between the nearest
/// valid neighbours. Leading and trailing gaps have only one neighbour and stay NaN.
pub fn interpolate_time(dates: &[NaiveDate], values: &[f64]) -> Vec<f64> {
    let mut result = values.to_vec();
    let valid: Vec<usize> = (0..values.len())
        .filter(|&i| values[i].is_finite())
        .collect();

    for pair in valid.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        if right - left < 2 {
            continue;
        }
        let span = (dates[right] - dates[left]).num_days() as f64;
        let (y0, y1) = (values[left], values[right]);
        for i in left + 1..right {
            let weight = if span > 0.0 {
                (dates[i] - dates[left]).num_days() as f64 / span
            } else {
                // duplicate dates: fall back to positional spacing
                (i - left) as f64 / (right - left) as f64
            };
            result[i] = y0 + weight * (y1 - y0);
        }
    }

    result
}

/// Replace remaining NaN values with the mean of the finite ones.
///
/// A column without any finite value is left untouched.
pub fn fill_mean(values: &mut [f64]) {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return;
    }
    let fill = mean(&finite);
    for v in values.iter_mut().filter(|v| !v.is_finite()) {
        *v = fill;
    }
}
