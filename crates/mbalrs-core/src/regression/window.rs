use crate::derive::DerivedRow;
use crate::error::{MbalError, MbalResult};
use crate::formulation::ParseOptionError;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of rows kept by [`FitWindowPolicy::TopKByPressure`] when none is given.
pub const DEFAULT_TOP_K: usize = 6;

/// Which admissible rows the straight line is fitted to.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FitWindowPolicy {
    #[default]
    AllPoints,
    /// the `k` highest pressure rows
    TopKByPressure(usize),
}

impl FitWindowPolicy {
    pub fn validate(&self) -> MbalResult<()> {
        match self {
            FitWindowPolicy::TopKByPressure(k) if *k < 2 => Err(MbalError::invalid(format!(
                "top-k window needs k of at least 2, got {k}"
            ))),
            _ => Ok(()),
        }
    }

    /// Picks the fit subset. Top-k ties keep series order.
    pub fn select(&self, admissible: &[DerivedRow]) -> Vec<DerivedRow> {
        match self {
            FitWindowPolicy::AllPoints => admissible.to_vec(),
            FitWindowPolicy::TopKByPressure(k) => admissible
                .iter()
                .copied()
                .sorted_by(|a, b| b.p().total_cmp(&a.p()))
                .take(*k)
                .collect(),
        }
    }
}

impl FromStr for FitWindowPolicy {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "all" | "all-points" => Ok(FitWindowPolicy::AllPoints),
            "top" | "top-k" => Ok(FitWindowPolicy::TopKByPressure(DEFAULT_TOP_K)),
            other => other
                .strip_prefix("top-")
                .or_else(|| other.strip_prefix("top"))
                .and_then(|k| k.parse::<usize>().ok())
                .map(FitWindowPolicy::TopKByPressure)
                .ok_or_else(|| ParseOptionError(format!("invalid fit window: {other}"))),
        }
    }
}

impl fmt::Display for FitWindowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitWindowPolicy::AllPoints => write!(f, "all"),
            FitWindowPolicy::TopKByPressure(k) => write!(f, "top-{k}"),
        }
    }
}

impl TryFrom<String> for FitWindowPolicy {
    type Error = ParseOptionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FitWindowPolicy> for String {
    fn from(value: FitWindowPolicy) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive_simple;
    use crate::measurement::MeasurementRow;
    use crate::params::InitialParameters;

    fn rows(pressures: &[f64]) -> Vec<DerivedRow> {
        let params = InitialParameters::new(1.2, 0.005, 500.0).unwrap();
        pressures
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let row = MeasurementRow::new(p, 10., 6_000., 1.22, 0.0055, 490.);
                derive_simple(i, &row, &params)
            })
            .collect()
    }

    #[test]
    fn parses_window_strings() {
        assert_eq!("all".parse::<FitWindowPolicy>().unwrap(), FitWindowPolicy::AllPoints);
        assert_eq!(
            "top".parse::<FitWindowPolicy>().unwrap(),
            FitWindowPolicy::TopKByPressure(DEFAULT_TOP_K)
        );
        assert_eq!("top-4".parse::<FitWindowPolicy>().unwrap(), FitWindowPolicy::TopKByPressure(4));
        assert_eq!("TOP8".parse::<FitWindowPolicy>().unwrap(), FitWindowPolicy::TopKByPressure(8));
        assert!("top-x".parse::<FitWindowPolicy>().is_err());
        assert!("bottom".parse::<FitWindowPolicy>().is_err());
    }

    #[test]
    fn k_below_two_is_rejected() {
        assert!(FitWindowPolicy::TopKByPressure(1).validate().is_err());
        assert!(FitWindowPolicy::TopKByPressure(2).validate().is_ok());
    }

    #[test]
    fn top_k_takes_highest_pressures() {
        let r = rows(&[2000., 3000., 2500., 1500., 2800.]);
        let picked = FitWindowPolicy::TopKByPressure(3).select(&r);
        assert_eq!(picked.iter().map(|r| r.p()).collect::<Vec<_>>(), vec![3000., 2800., 2500.]);
    }

    #[test]
    fn top_k_larger_than_rows_takes_all() {
        let r = rows(&[3000., 2500.]);
        assert_eq!(FitWindowPolicy::TopKByPressure(6).select(&r).len(), 2);
    }

    #[test]
    fn ties_keep_series_order() {
        let r = rows(&[2500., 3000., 2500., 2500.]);
        let picked = FitWindowPolicy::TopKByPressure(3).select(&r);
        assert_eq!(picked.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1, 0, 2]);
    }

    #[test]
    fn all_points_is_identity() {
        let r = rows(&[2000., 3000.]);
        assert_eq!(FitWindowPolicy::AllPoints.select(&r), r);
    }
}
