use crate::config::AnalysisConfig;
use crate::derive::derive_series;
use crate::error::MbalResult;
use crate::filter::filter_admissible;
use crate::measurement::MeasurementSeries;
use crate::params::InitialParameters;
use crate::quality::evaluate_fit;
use crate::regression::fit_regression;
use crate::result::{assemble, MaterialBalanceResult};

/// Runs one Havlena-Odeh analysis: derive, filter, fit, score, assemble.
///
/// Holds no state between calls; concurrent runs on separate inputs are
/// independent.
pub fn run_analysis(
    params: &InitialParameters,
    series: &MeasurementSeries,
    cfg: &AnalysisConfig,
) -> MbalResult<MaterialBalanceResult> {
    cfg.validate()?;
    series.validate()?;
    let formulation = params.resolve_formulation(cfg.formulation)?;

    let derived = derive_series(series, params, formulation, cfg.withdrawal)?;
    let filtered = filter_admissible(derived)?;
    tracing::debug!(
        %formulation,
        admissible = filtered.admissible.len(),
        rejected = filtered.rejected.len(),
        "rows filtered"
    );

    let regression = fit_regression(
        &filtered.admissible,
        cfg.window,
        params,
        formulation,
        cfg.no_gas_cap_refit,
    )?;
    let quality = evaluate_fit(&regression, &filtered.admissible, cfg.degenerate_r2);
    tracing::trace!(
        n = regression.estimate.n,
        g = regression.estimate.g,
        m = regression.estimate.m,
        r_squared = quality.r_squared,
        "fit evaluated"
    );

    Ok(assemble(formulation, cfg.window, filtered, regression, quality))
}
