pub mod engine;
pub mod gascap;
pub mod window;

pub use engine::{fit_regression, RegressionOutcome};
pub use gascap::GasCapEstimate;
pub use window::{FitWindowPolicy, DEFAULT_TOP_K};
