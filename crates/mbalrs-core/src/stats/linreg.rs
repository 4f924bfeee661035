use crate::error::{MbalError, MbalResult};
use crate::stats::stats::{count_distinct, mean};

use serde::Serialize;
use std::fmt;

/// Straight line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinReg {
    pub intercept: f64,
    pub slope: f64,
}

impl fmt::Display for LinReg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Y = ({:.4}) X + ({:.4})", self.slope, self.intercept)
    }
}

impl LinReg {
    pub fn calculate(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
    pub fn from_val(intercept: f64, slope: f64) -> Self {
        Self { intercept, slope }
    }

    /// Ordinary least squares, closed form.
    pub fn train(x: &[f64], y: &[f64]) -> MbalResult<Self> {
        if x.len() != y.len() {
            return Err(MbalError::invalid(format!(
                "x and y have different lengths: {} vs {}",
                x.len(),
                y.len()
            )));
        }
        let distinct_x = count_distinct(x);
        if distinct_x < 2 {
            return Err(MbalError::DegenerateFit { distinct_x });
        }

        let avg_x = mean(x);
        let avg_y = mean(y);

        let ss_xx: f64 = x.iter().map(|xi| (xi - avg_x).powi(2)).sum();
        let ss_xy: f64 = x.iter().zip(y).map(|(xi, yi)| (xi - avg_x) * (yi - avg_y)).sum();

        // no variance in x, no meaningful regression
        if !ss_xx.is_finite() || ss_xx <= 0.0 {
            return Err(MbalError::DegenerateFit { distinct_x });
        }
        let slope = ss_xy / ss_xx;
        let intercept = avg_y - slope * avg_x;

        Ok(Self { intercept, slope })
    }

    /// Least squares line forced through the origin, `y = slope * x`.
    pub fn train_through_origin(x: &[f64], y: &[f64]) -> MbalResult<Self> {
        let ss_xx: f64 = x.iter().map(|xi| xi * xi).sum();
        if !ss_xx.is_finite() || ss_xx <= 0.0 {
            return Err(MbalError::DegenerateFit { distinct_x: count_distinct(x) });
        }
        let ss_xy: f64 = x.iter().zip(y).map(|(xi, yi)| xi * yi).sum();
        Ok(Self { intercept: 0.0, slope: ss_xy / ss_xx })
    }

    /// Flat line at `level`.
    pub fn constant(level: f64) -> Self {
        Self { intercept: level, slope: 0.0 }
    }
}
