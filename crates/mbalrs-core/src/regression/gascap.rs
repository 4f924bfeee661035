use crate::error::{MbalError, MbalResult};
use crate::formulation::FormulationVariant;
use crate::params::InitialParameters;
use crate::stats::LinReg;

use serde::Serialize;

/// Volumes read off the fitted line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GasCapEstimate {
    /// original oil in place
    pub n: f64,
    /// gas cap gas in place
    pub g: f64,
    /// gas cap to oil volume ratio
    pub m: f64,
    pub gas_cap_present: bool,
}

impl GasCapEstimate {
    pub fn without_gas_cap(n: f64) -> Self {
        Self { n, g: 0.0, m: 0.0, gas_cap_present: false }
    }
}

/// Reads N, G and m from the line coefficients.
///
/// Simple: `y = N x + G`, so `m = G Bgi / (N Boi)`.
/// Extended: `y = N + N m x`, so `m = slope / intercept` and `G = N m Boi / Bgi`.
pub fn interpret(
    line: &LinReg,
    formulation: FormulationVariant,
    params: &InitialParameters,
    distinct_x: usize,
) -> MbalResult<GasCapEstimate> {
    let (n, g, m) = match formulation {
        FormulationVariant::Simple => {
            let n = line.slope;
            let g = line.intercept;
            (n, g, (g * params.bgi()) / (n * params.boi()))
        },
        FormulationVariant::Extended => {
            let n = line.intercept;
            let m = line.slope / line.intercept;
            (n, n * m * (params.boi() / params.bgi()), m)
        },
    };
    // N = 0 leaves m undefined
    if !m.is_finite() {
        return Err(MbalError::DegenerateFit { distinct_x });
    }
    Ok(GasCapEstimate { n, g, m, gas_cap_present: true })
}
