//! Havlena-Odeh material balance for gas-cap oil reservoirs.
//!
//! [`run_analysis`] takes validated initial parameters and a measurement
//! series and returns the straight-line estimate of oil in place (N), gas cap
//! gas in place (G) and gas cap ratio (m), together with the per-row table
//! behind it.

pub mod config;
pub mod derive;
pub mod error;
pub mod filter;
pub mod formulation;
pub mod measurement;
pub mod params;
pub mod pipeline;
pub mod quality;
pub mod regression;
pub mod result;
pub mod stats;

pub use config::{AnalysisConfig, ConfigError, DegenerateR2, NoGasCapRefit};
pub use derive::{DerivedRow, DerivedValues};
pub use error::{MbalError, MbalResult};
pub use filter::{DropReason, RejectedRow};
pub use formulation::{FormulationVariant, WithdrawalConvention};
pub use measurement::{MeasurementRow, MeasurementSeries};
pub use params::InitialParameters;
pub use pipeline::run_analysis;
pub use regression::{FitWindowPolicy, DEFAULT_TOP_K};
pub use result::{FitResult, MaterialBalanceResult};
