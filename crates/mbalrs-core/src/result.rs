use crate::derive::DerivedRow;
use crate::filter::{FilterOutcome, RejectedRow};
use crate::formulation::FormulationVariant;
use crate::quality::FitQuality;
use crate::regression::{FitWindowPolicy, RegressionOutcome};
use crate::stats::LinReg;

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub slope: f64,
    pub intercept: f64,
    pub n: f64,
    pub g: f64,
    pub m: f64,
    pub r_squared: f64,
    pub gas_cap_present: bool,
    pub fit_points: Vec<DerivedRow>,
}

impl FitResult {
    pub fn line(&self) -> LinReg {
        LinReg::from_val(self.intercept, self.slope)
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "N: {:.2}, G: {:.2}, m: {:.4}, r2: {:.4}, gas cap: {}",
            self.n,
            self.g,
            self.m,
            self.r_squared,
            if self.gas_cap_present { "present" } else { "absent" }
        )
    }
}

/// Everything one analysis run hands to the presentation side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialBalanceResult {
    pub formulation: FormulationVariant,
    pub window: FitWindowPolicy,
    pub fit: FitResult,
    /// OLS line before any no-gas-cap constraint
    pub unconstrained: LinReg,
    pub rmse: f64,
    /// fitted value per admissible row
    pub predictions: Vec<f64>,
    /// residual per admissible row
    pub residuals: Vec<f64>,
    pub admissible_rows: Vec<DerivedRow>,
    pub rejected_rows: Vec<RejectedRow>,
}

impl MaterialBalanceResult {
    /// Whether the admissible row with this series index was used in the fit.
    pub fn in_fit(&self, index: usize) -> bool {
        self.fit.fit_points.iter().any(|r| r.index == index)
    }
}

pub fn assemble(
    formulation: FormulationVariant,
    window: FitWindowPolicy,
    filtered: FilterOutcome,
    regression: RegressionOutcome,
    quality: FitQuality,
) -> MaterialBalanceResult {
    let RegressionOutcome { unconstrained, line, estimate, fit_points } = regression;
    let FitQuality { r_squared, rmse, predictions, residuals } = quality;

    MaterialBalanceResult {
        formulation,
        window,
        fit: FitResult {
            slope: line.slope,
            intercept: line.intercept,
            n: estimate.n,
            g: estimate.g,
            m: estimate.m,
            r_squared,
            gas_cap_present: estimate.gas_cap_present,
            fit_points,
        },
        unconstrained,
        rmse,
        predictions,
        residuals,
        admissible_rows: filtered.admissible,
        rejected_rows: filtered.rejected,
    }
}
