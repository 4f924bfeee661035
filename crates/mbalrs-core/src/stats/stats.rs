use itertools::Itertools;
use statrs::statistics::Statistics;

/// Arithmetic mean, NaN for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    data.iter().mean()
}

/// Number of distinct values, comparing by exact equality.
pub fn count_distinct(data: &[f64]) -> usize {
    data.iter().copied().sorted_by(f64::total_cmp).dedup().count()
}

pub fn residuals(y: &[f64], y_hat: &[f64]) -> Vec<f64> {
    y.iter().zip(y_hat).map(|(&yi, &yhi)| yi - yhi).collect()
}

/// Coefficient of determination. `None` when the lengths differ, there are no
/// points, or `y` has no variance.
pub fn r2_from_predictions(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    if y.len() != y_hat.len() || y.is_empty() {
        return None;
    }

    let y_mean = mean(y);

    let ss_res: f64 = y.iter().zip(y_hat).map(|(&yi, &yhi)| (yi - yhi).powi(2)).sum();
    let ss_tot: f64 = y.iter().map(|&yi| (yi - y_mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return None;
    }

    Some(1.0 - ss_res / ss_tot)
}

pub fn rmse(y: &[f64], y_hat: &[f64]) -> Option<f64> {
    if y.len() != y_hat.len() || y.is_empty() {
        return None;
    }

    let sum_sq: f64 = y.iter().zip(y_hat.iter()).map(|(&yi, &yhi)| (yi - yhi).powi(2)).sum();

    Some((sum_sq / y.len() as f64).sqrt())
}
