use crate::config::NoGasCapRefit;
use crate::derive::DerivedRow;
use crate::error::MbalResult;
use crate::formulation::FormulationVariant;
use crate::params::InitialParameters;
use crate::regression::gascap::{interpret, GasCapEstimate};
use crate::regression::window::FitWindowPolicy;
use crate::stats::stats::{count_distinct, mean};
use crate::stats::LinReg;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionOutcome {
    /// plain OLS line over the fit subset
    pub unconstrained: LinReg,
    /// line that is reported, constrained when there is no gas cap
    pub line: LinReg,
    pub estimate: GasCapEstimate,
    /// rows the line was fitted to, in selection order
    pub fit_points: Vec<DerivedRow>,
}

impl RegressionOutcome {
    pub fn gas_cap_present(&self) -> bool {
        self.estimate.gas_cap_present
    }
}

fn no_gas_cap_line(
    fitted_n: f64,
    x: &[f64],
    y: &[f64],
    formulation: FormulationVariant,
    refit: NoGasCapRefit,
) -> MbalResult<LinReg> {
    let line = match (formulation, refit) {
        (FormulationVariant::Extended, NoGasCapRefit::KeepFittedN) => LinReg::constant(fitted_n),
        (FormulationVariant::Extended, NoGasCapRefit::LeastSquares) => LinReg::constant(mean(y)),
        (FormulationVariant::Simple, NoGasCapRefit::KeepFittedN) => LinReg::from_val(0.0, fitted_n),
        (FormulationVariant::Simple, NoGasCapRefit::LeastSquares) => {
            LinReg::train_through_origin(x, y)?
        },
    };
    Ok(line)
}

/// Fits the straight line over the window of `admissible` and reads N, G and m
/// from it. A negative m means no gas cap and switches to the constrained line.
pub fn fit_regression(
    admissible: &[DerivedRow],
    window: FitWindowPolicy,
    params: &InitialParameters,
    formulation: FormulationVariant,
    refit: NoGasCapRefit,
) -> MbalResult<RegressionOutcome> {
    window.validate()?;
    let fit_points = window.select(admissible);
    tracing::debug!(%window, selected = fit_points.len(), of = admissible.len(), "fit window");

    let x: Vec<f64> = fit_points.iter().map(DerivedRow::x).collect();
    let y: Vec<f64> = fit_points.iter().map(DerivedRow::y).collect();

    let unconstrained = LinReg::train(&x, &y)?;
    let estimate = interpret(&unconstrained, formulation, params, count_distinct(&x))?;

    if estimate.m < 0.0 {
        tracing::debug!(m = estimate.m, %refit, "negative gas cap ratio, no gas cap");
        let line = no_gas_cap_line(estimate.n, &x, &y, formulation, refit)?;
        let n = match formulation {
            FormulationVariant::Extended => line.intercept,
            FormulationVariant::Simple => line.slope,
        };
        return Ok(RegressionOutcome {
            unconstrained,
            line,
            estimate: GasCapEstimate::without_gas_cap(n),
            fit_points,
        });
    }

    Ok(RegressionOutcome { unconstrained, line: unconstrained, estimate, fit_points })
}
