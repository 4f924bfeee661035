use crate::error::{MbalError, MbalResult};
use crate::formulation::FormulationVariant;

use serde::Serialize;

/// Rock and connate water compressibility terms for the extended formulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Compressibility {
    /// connate water saturation, fraction
    pub swc: f64,
    /// formation compressibility, 1/psi
    pub cf: f64,
    /// water compressibility, 1/psi
    pub cw: f64,
}

impl Compressibility {
    /// `(Cw * Swc + Cf) / (1 - Swc)`, multiplied by dP to get Efw.
    pub fn expansion_factor(&self) -> f64 {
        (self.cw * self.swc + self.cf) / (1.0 - self.swc)
    }
}

/// Initial reservoir parameters. Validated on construction, immutable after.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InitialParameters {
    boi: f64,
    bgi: f64,
    rsi: f64,
    compressibility: Option<Compressibility>,
    initial_pressure: Option<f64>,
}

fn require_finite(name: &str, value: f64) -> MbalResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MbalError::invalid(format!("{name} must be a finite number, got {value}")))
    }
}

impl InitialParameters {
    pub fn new(boi: f64, bgi: f64, rsi: f64) -> MbalResult<Self> {
        let boi = require_finite("Boi", boi)?;
        let bgi = require_finite("Bgi", bgi)?;
        let rsi = require_finite("Rsi", rsi)?;
        if boi <= 0.0 {
            return Err(MbalError::invalid(format!("Boi must be positive, got {boi}")));
        }
        if bgi <= 0.0 {
            return Err(MbalError::invalid(format!("Bgi must be positive, got {bgi}")));
        }
        Ok(Self { boi, bgi, rsi, compressibility: None, initial_pressure: None })
    }

    pub fn with_compressibility(mut self, swc: f64, cf: f64, cw: f64) -> MbalResult<Self> {
        let swc = require_finite("Swc", swc)?;
        let cf = require_finite("Cf", cf)?;
        let cw = require_finite("Cw", cw)?;
        if !(0.0..1.0).contains(&swc) {
            return Err(MbalError::invalid(format!("Swc must be in [0, 1), got {swc}")));
        }
        self.compressibility = Some(Compressibility { swc, cf, cw });
        Ok(self)
    }

    pub fn with_initial_pressure(mut self, pi: f64) -> MbalResult<Self> {
        self.initial_pressure = Some(require_finite("Pi", pi)?);
        Ok(self)
    }

    pub fn boi(&self) -> f64 {
        self.boi
    }
    pub fn bgi(&self) -> f64 {
        self.bgi
    }
    pub fn rsi(&self) -> f64 {
        self.rsi
    }
    pub fn compressibility(&self) -> Option<Compressibility> {
        self.compressibility
    }
    pub fn initial_pressure(&self) -> Option<f64> {
        self.initial_pressure
    }

    /// Formulation picked when the caller does not ask for one.
    pub fn default_formulation(&self) -> FormulationVariant {
        match self.compressibility {
            Some(_) => FormulationVariant::Extended,
            None => FormulationVariant::Simple,
        }
    }

    /// Resolves a requested formulation against the parameters present.
    pub fn resolve_formulation(
        &self,
        requested: Option<FormulationVariant>,
    ) -> MbalResult<FormulationVariant> {
        match requested {
            None => Ok(self.default_formulation()),
            Some(FormulationVariant::Extended) if self.compressibility.is_none() => {
                Err(MbalError::invalid(
                    "extended formulation needs Swc, Cf and Cw in the initial parameters",
                ))
            },
            Some(variant) => Ok(variant),
        }
    }
}
