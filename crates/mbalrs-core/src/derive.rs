use crate::error::{MbalError, MbalResult};
use crate::formulation::{FormulationVariant, WithdrawalConvention};
use crate::measurement::{MeasurementRow, MeasurementSeries};
use crate::params::InitialParameters;

use serde::Serialize;

/// Quantities computed from one raw row. Divisions are left as they come out
/// (inf/NaN included) so the admissibility filter can decide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedValues {
    /// pressure drop from initial, extended formulation only
    pub dp: Option<f64>,
    /// oil and liberated gas expansion
    pub eo: f64,
    /// gas cap expansion
    pub eg: f64,
    /// rock and connate water expansion, extended formulation only
    pub efw: Option<f64>,
    /// cumulative produced gas-oil ratio, 0 when nothing was produced
    pub rp: f64,
    /// underground withdrawal
    pub f: f64,
    pub x: f64,
    pub y: f64,
}

impl DerivedValues {
    /// Divisor shared by x and y.
    pub fn denominator(&self) -> f64 {
        match self.efw {
            Some(efw) => self.eo + efw,
            None => self.eg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedRow {
    /// position in the raw series
    pub index: usize,
    pub raw: MeasurementRow,
    pub derived: DerivedValues,
}

impl DerivedRow {
    pub fn p(&self) -> f64 {
        self.raw.p
    }
    pub fn x(&self) -> f64 {
        self.derived.x
    }
    pub fn y(&self) -> f64 {
        self.derived.y
    }
}

fn produced_gas_oil_ratio(np: f64, gp: f64) -> f64 {
    if np == 0.0 {
        0.0
    } else {
        gp / np
    }
}

fn oil_expansion(row: &MeasurementRow, params: &InitialParameters) -> f64 {
    (row.bo - params.boi()) + (row.rs - params.rsi()) * row.bg
}

fn withdrawal(
    row: &MeasurementRow,
    params: &InitialParameters,
    convention: WithdrawalConvention,
) -> f64 {
    let oil = match convention {
        WithdrawalConvention::FromInitial => row.np * (row.bo - params.boi()),
        WithdrawalConvention::Total => row.np * row.bo,
    };
    oil + (row.gp - row.np * params.rsi()) * row.bg
}

pub fn derive_simple(index: usize, row: &MeasurementRow, params: &InitialParameters) -> DerivedRow {
    let eo = oil_expansion(row, params);
    let eg = row.bg - params.bgi();
    let f = withdrawal(row, params, WithdrawalConvention::FromInitial);

    DerivedRow {
        index,
        raw: *row,
        derived: DerivedValues {
            dp: None,
            eo,
            eg,
            efw: None,
            rp: produced_gas_oil_ratio(row.np, row.gp),
            f,
            x: eo / eg,
            y: f / eg,
        },
    }
}

pub fn derive_extended(
    index: usize,
    row: &MeasurementRow,
    params: &InitialParameters,
    initial_pressure: f64,
    expansion_factor: f64,
    convention: WithdrawalConvention,
) -> DerivedRow {
    let dp = initial_pressure - row.p;
    let efw = expansion_factor * dp;
    let eo = oil_expansion(row, params);
    let eg = row.bg - params.bgi();
    let f = withdrawal(row, params, convention);
    let denominator = eo + efw;

    DerivedRow {
        index,
        raw: *row,
        derived: DerivedValues {
            dp: Some(dp),
            eo,
            eg,
            efw: Some(efw),
            rp: produced_gas_oil_ratio(row.np, row.gp),
            f,
            x: (eg + efw) / denominator,
            y: f / denominator,
        },
    }
}

/// Computes the derived quantities of every row, in series order.
pub fn derive_series(
    series: &MeasurementSeries,
    params: &InitialParameters,
    formulation: FormulationVariant,
    convention: WithdrawalConvention,
) -> MbalResult<Vec<DerivedRow>> {
    match formulation {
        FormulationVariant::Simple => Ok(series
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| derive_simple(i, row, params))
            .collect()),
        FormulationVariant::Extended => {
            let compressibility = params.compressibility().ok_or_else(|| {
                MbalError::invalid("extended formulation needs Swc, Cf and Cw")
            })?;
            // Pi falls back to the first recorded pressure
            let pi = match (params.initial_pressure(), series.first()) {
                (Some(pi), _) => pi,
                (None, Some(first)) => first.p,
                (None, None) => return Ok(Vec::new()),
            };
            let factor = compressibility.expansion_factor();
            Ok(series
                .rows()
                .iter()
                .enumerate()
                .map(|(i, row)| derive_extended(i, row, params, pi, factor, convention))
                .collect())
        },
    }
}
