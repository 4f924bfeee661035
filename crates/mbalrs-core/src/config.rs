use crate::error::MbalResult;
use crate::formulation::{FormulationVariant, ParseOptionError, WithdrawalConvention};
use crate::regression::window::FitWindowPolicy;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// How N is set once the fit shows no gas cap (m < 0).
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoGasCapRefit {
    /// N keeps the value read from the unconstrained line
    #[default]
    KeepFittedN,
    /// N is refit by least squares with G fixed at zero
    LeastSquares,
}

impl FromStr for NoGasCapRefit {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" | "keep-fitted-n" => Ok(NoGasCapRefit::KeepFittedN),
            "refit" | "least-squares" => Ok(NoGasCapRefit::LeastSquares),
            other => Err(ParseOptionError(format!("invalid no-gas-cap refit: {other}"))),
        }
    }
}

impl fmt::Display for NoGasCapRefit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoGasCapRefit::KeepFittedN => write!(f, "keep-fitted-n"),
            NoGasCapRefit::LeastSquares => write!(f, "least-squares"),
        }
    }
}

/// R² reported when the fit shows no gas cap.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DegenerateR2 {
    /// always 1.0
    #[default]
    Fixed,
    /// evaluated from the residuals of the constrained line
    Recompute,
}

impl FromStr for DegenerateR2 {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(DegenerateR2::Fixed),
            "recompute" => Ok(DegenerateR2::Recompute),
            other => Err(ParseOptionError(format!("invalid degenerate R2 policy: {other}"))),
        }
    }
}

impl fmt::Display for DegenerateR2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegenerateR2::Fixed => write!(f, "fixed"),
            DegenerateR2::Recompute => write!(f, "recompute"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Every knob of one analysis run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// `None` picks the formulation from the parameters present
    pub formulation: Option<FormulationVariant>,
    pub window: FitWindowPolicy,
    pub withdrawal: WithdrawalConvention,
    pub no_gas_cap_refit: NoGasCapRefit,
    pub degenerate_r2: DegenerateR2,
}

impl AnalysisConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> MbalResult<()> {
        self.window.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(AnalysisConfig::from_toml_str("").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn full_toml() {
        let cfg = AnalysisConfig::from_toml_str(
            r#"
formulation = "extended"
window = "top-6"
withdrawal = "total"
no_gas_cap_refit = "least-squares"
degenerate_r2 = "recompute"
"#,
        )
        .unwrap();
        assert_eq!(cfg.formulation, Some(FormulationVariant::Extended));
        assert_eq!(cfg.window, FitWindowPolicy::TopKByPressure(6));
        assert_eq!(cfg.withdrawal, WithdrawalConvention::Total);
        assert_eq!(cfg.no_gas_cap_refit, NoGasCapRefit::LeastSquares);
        assert_eq!(cfg.degenerate_r2, DegenerateR2::Recompute);
    }

    #[test]
    fn unknown_key_fails() {
        assert!(AnalysisConfig::from_toml_str("windw = \"all\"").is_err());
    }

    #[test]
    fn bad_window_fails() {
        assert!(AnalysisConfig::from_toml_str("window = \"middle\"").is_err());
    }

    #[test]
    fn validate_catches_small_k() {
        let cfg =
            AnalysisConfig { window: FitWindowPolicy::TopKByPressure(1), ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
