use crate::config::DegenerateR2;
use crate::derive::DerivedRow;
use crate::regression::RegressionOutcome;
use crate::stats::stats::{r2_from_predictions, residuals, rmse};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitQuality {
    pub r_squared: f64,
    pub rmse: f64,
    /// reported line evaluated at each admissible row
    pub predictions: Vec<f64>,
    /// `y - y_fit` for each admissible row
    pub residuals: Vec<f64>,
}

/// Scores the reported line against every admissible row, not only the rows
/// it was fitted to. A target with no variance scores 1.0.
pub fn evaluate_fit(
    outcome: &RegressionOutcome,
    admissible: &[DerivedRow],
    degenerate_r2: DegenerateR2,
) -> FitQuality {
    let y: Vec<f64> = admissible.iter().map(DerivedRow::y).collect();
    let predictions: Vec<f64> =
        admissible.iter().map(|row| outcome.line.calculate(row.x())).collect();

    let r_squared = match (outcome.gas_cap_present(), degenerate_r2) {
        (false, DegenerateR2::Fixed) => 1.0,
        _ => r2_from_predictions(&y, &predictions).unwrap_or(1.0),
    };

    FitQuality {
        r_squared,
        rmse: rmse(&y, &predictions).unwrap_or(0.0),
        residuals: residuals(&y, &predictions),
        predictions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::DerivedValues;
    use crate::measurement::MeasurementRow;
    use crate::regression::GasCapEstimate;
    use crate::stats::LinReg;

    fn point(index: usize, x: f64, y: f64) -> DerivedRow {
        DerivedRow {
            index,
            raw: MeasurementRow::new(3000. - index as f64, 0., 0., 0., 0., 0.),
            derived: DerivedValues { dp: None, eo: 0., eg: 1., efw: None, rp: 0., f: y, x, y },
        }
    }

    fn outcome(line: LinReg, present: bool, fit_points: Vec<DerivedRow>) -> RegressionOutcome {
        let estimate = if present {
            GasCapEstimate { n: line.slope, g: line.intercept, m: 0.1, gas_cap_present: true }
        } else {
            GasCapEstimate::without_gas_cap(line.slope)
        };
        RegressionOutcome { unconstrained: line, line, estimate, fit_points }
    }

    #[test]
    fn exact_line_scores_one() {
        let rows: Vec<_> = (0..4).map(|i| point(i, i as f64, 3.0 * i as f64 + 1.0)).collect();
        let q = evaluate_fit(
            &outcome(LinReg::from_val(1.0, 3.0), true, rows.clone()),
            &rows,
            DegenerateR2::Fixed,
        );
        assert!((q.r_squared - 1.0).abs() < 1e-12);
        assert!(q.rmse < 1e-12);
        assert!(q.residuals.iter().all(|r| r.abs() < 1e-12));
    }

    #[test]
    fn scored_over_all_admissible_rows() {
        let rows = vec![point(0, 0., 0.), point(1, 1., 1.), point(2, 2., 2.), point(3, 3., 6.)];
        // line fitted to the first three rows only
        let out = outcome(LinReg::from_val(0.0, 1.0), true, rows[..3].to_vec());
        let q = evaluate_fit(&out, &rows, DegenerateR2::Fixed);

        // y mean = 2.25, ss_tot = 5.0625 + 1.5625 + 0.0625 + 14.0625 = 20.75, ss_res = 9
        assert!((q.r_squared - (1.0 - 9.0 / 20.75)).abs() < 1e-12);
        assert_eq!(q.residuals.len(), 4);
        assert!((q.residuals[3] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn no_gas_cap_fixed_is_one() {
        let rows = vec![point(0, 1., 5.), point(1, 2., 9.), point(2, 3., 4.)];
        let out = outcome(LinReg::constant(6.0), false, rows.clone());
        assert_eq!(evaluate_fit(&out, &rows, DegenerateR2::Fixed).r_squared, 1.0);
        let recomputed = evaluate_fit(&out, &rows, DegenerateR2::Recompute).r_squared;
        assert!(recomputed < 1.0);
    }

    #[test]
    fn flat_target_scores_one() {
        let rows = vec![point(0, 1., 5.), point(1, 2., 5.)];
        let out = outcome(LinReg::from_val(5.0, 0.0), true, rows.clone());
        assert_eq!(evaluate_fit(&out, &rows, DegenerateR2::Recompute).r_squared, 1.0);
    }
}
