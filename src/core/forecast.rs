//! Forecast result structure for holding predictions.

/// Out-of-sample point predictions with optional prediction intervals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
        }
    }

    /// Create a forecast with prediction intervals.
    pub fn from_values_with_intervals(values: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Number of forecast steps.
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.point
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    pub fn into_values(self) -> Vec<f64> {
        self.point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_forecast() {
        let forecast = Forecast::new();
        assert!(forecast.is_empty());
        assert_eq!(forecast.horizon(), 0);
        assert!(forecast.lower().is_none());
    }

    #[test]
    fn forecast_with_intervals() {
        let forecast =
            Forecast::from_values_with_intervals(vec![2.0, 3.0], vec![1.0, 1.5], vec![3.0, 4.5]);
        assert_eq!(forecast.horizon(), 2);
        assert_eq!(forecast.lower().unwrap(), &[1.0, 1.5]);
        assert_eq!(forecast.upper().unwrap(), &[3.0, 4.5]);
        assert_eq!(forecast.into_values(), vec![2.0, 3.0]);
    }
}
