pub mod linreg;
pub mod stats;

pub use linreg::LinReg;
