use crate::derive::DerivedRow;
use crate::error::{MbalError, MbalResult};

use serde::Serialize;
use std::fmt;

pub const MIN_ADMISSIBLE_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DerivedField {
    DP,
    Eo,
    Eg,
    Efw,
    Rp,
    F,
    X,
    Y,
}

impl fmt::Display for DerivedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DerivedField::DP => "dP",
            DerivedField::Eo => "Eo",
            DerivedField::Eg => "Eg",
            DerivedField::Efw => "Efw",
            DerivedField::Rp => "Rp",
            DerivedField::F => "F",
            DerivedField::X => "x",
            DerivedField::Y => "y",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Denominator {
    Eg,
    EoPlusEfw,
}

impl fmt::Display for Denominator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denominator::Eg => write!(f, "Eg"),
            Denominator::EoPlusEfw => write!(f, "Eo + Efw"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DropReason {
    ZeroDenominator { denominator: Denominator },
    NonFinite { field: DerivedField },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::ZeroDenominator { denominator } => {
                write!(f, "regression denominator {denominator} is zero")
            },
            DropReason::NonFinite { field } => write!(f, "{field} is not finite"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub row: DerivedRow,
    pub reasons: Vec<DropReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOutcome {
    pub admissible: Vec<DerivedRow>,
    pub rejected: Vec<RejectedRow>,
}

/// Every reason the row cannot enter the regression. Empty means admissible.
pub fn drop_reasons(row: &DerivedRow) -> Vec<DropReason> {
    let d = &row.derived;
    let mut reasons = Vec::new();

    let denominator = match d.efw {
        Some(_) => Denominator::EoPlusEfw,
        None => Denominator::Eg,
    };
    if d.denominator() == 0.0 {
        reasons.push(DropReason::ZeroDenominator { denominator });
    }

    let fields = [
        (DerivedField::DP, d.dp),
        (DerivedField::Eo, Some(d.eo)),
        (DerivedField::Eg, Some(d.eg)),
        (DerivedField::Efw, d.efw),
        (DerivedField::Rp, Some(d.rp)),
        (DerivedField::F, Some(d.f)),
        (DerivedField::X, Some(d.x)),
        (DerivedField::Y, Some(d.y)),
    ];
    reasons.extend(
        fields
            .into_iter()
            .filter_map(|(field, value)| value.filter(|v| !v.is_finite()).map(|_| field))
            .map(|field| DropReason::NonFinite { field }),
    );
    reasons
}

/// Splits derived rows into admissible and rejected, keeping series order.
pub fn partition_rows(rows: Vec<DerivedRow>) -> FilterOutcome {
    let mut admissible = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();

    for row in rows {
        let reasons = drop_reasons(&row);
        if reasons.is_empty() {
            admissible.push(row);
        } else {
            tracing::debug!(
                index = row.index,
                reasons = %reasons.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
                "row dropped"
            );
            rejected.push(RejectedRow { row, reasons });
        }
    }
    FilterOutcome { admissible, rejected }
}

/// Like [`partition_rows`] but fails when too few rows survive to fit a line.
pub fn filter_admissible(rows: Vec<DerivedRow>) -> MbalResult<FilterOutcome> {
    let outcome = partition_rows(rows);
    if outcome.admissible.len() < MIN_ADMISSIBLE_ROWS {
        return Err(MbalError::InsufficientData {
            admissible: outcome.admissible.len(),
            required: MIN_ADMISSIBLE_ROWS,
        });
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{derive_series, derive_simple};
    use crate::formulation::FormulationVariant;
    use crate::measurement::MeasurementRow;
    use crate::params::InitialParameters;

    fn params() -> InitialParameters {
        InitialParameters::new(1.2, 0.005, 500.0).unwrap()
    }

    #[test]
    fn zero_eg_row_reports_denominator_and_fields() {
        let row = MeasurementRow::new(3000., 0., 0., 1.2, 0.005, 500.);
        let derived = derive_simple(0, &row, &params());
        let reasons = drop_reasons(&derived);

        assert_eq!(reasons[0], DropReason::ZeroDenominator { denominator: Denominator::Eg });
        // Eo = 0 and F = 0, so both coordinates are 0/0
        assert!(reasons.contains(&DropReason::NonFinite { field: DerivedField::X }));
        assert!(reasons.contains(&DropReason::NonFinite { field: DerivedField::Y }));
        assert!(!reasons.contains(&DropReason::NonFinite { field: DerivedField::Eg }));
    }

    #[test]
    fn finite_row_is_admissible() {
        let row = MeasurementRow::new(2500., 100., 50_000., 1.25, 0.006, 480.);
        assert!(drop_reasons(&derive_simple(0, &row, &params())).is_empty());
    }

    #[test]
    fn extended_zero_denominator() {
        let p = params().with_compressibility(0.2, 4e-6, 3e-6).unwrap();
        let series = vec![MeasurementRow::new(3000., 0., 0., 1.2, 0.005, 500.)].into();
        let rows =
            derive_series(&series, &p, FormulationVariant::Extended, Default::default()).unwrap();
        assert_eq!(
            drop_reasons(&rows[0])[0],
            DropReason::ZeroDenominator { denominator: Denominator::EoPlusEfw }
        );
    }

    #[test]
    fn single_admissible_row_is_insufficient() {
        let series = vec![
            MeasurementRow::new(3000., 0., 0., 1.2, 0.005, 500.),
            MeasurementRow::new(2500., 100., 50_000., 1.25, 0.006, 480.),
        ]
        .into();
        let rows =
            derive_series(&series, &params(), FormulationVariant::Simple, Default::default())
                .unwrap();
        let err = filter_admissible(rows).unwrap_err();
        assert_eq!(err, MbalError::InsufficientData { admissible: 1, required: 2 });
    }

    #[test]
    fn partition_keeps_order_and_indices() {
        let series = vec![
            MeasurementRow::new(3000., 0., 0., 1.2, 0.005, 500.),
            MeasurementRow::new(2800., 50., 30_000., 1.22, 0.0055, 490.),
            MeasurementRow::new(2500., 100., 50_000., 1.25, 0.006, 480.),
        ]
        .into();
        let rows =
            derive_series(&series, &params(), FormulationVariant::Simple, Default::default())
                .unwrap();
        let outcome = filter_admissible(rows).unwrap();
        assert_eq!(outcome.admissible.iter().map(|r| r.index).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].row.index, 0);
    }
}
