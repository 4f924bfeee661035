use crate::error::{MbalError, MbalResult};

use serde::Serialize;

/// One observation of the production table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurementRow {
    /// reservoir pressure
    pub p: f64,
    /// cumulative oil produced
    pub np: f64,
    /// cumulative gas produced
    pub gp: f64,
    pub bo: f64,
    pub bg: f64,
    pub rs: f64,
}

impl MeasurementRow {
    pub fn new(p: f64, np: f64, gp: f64, bo: f64, bg: f64, rs: f64) -> Self {
        Self { p, np, gp, bo, bg, rs }
    }

    fn fields(&self) -> [(&'static str, f64); 6] {
        [
            ("p", self.p),
            ("Np", self.np),
            ("Gp", self.gp),
            ("Bo", self.bo),
            ("Bg", self.bg),
            ("Rs", self.rs),
        ]
    }
}

/// Rows in the order they were loaded (chronological, pressure descending).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasurementSeries {
    rows: Vec<MeasurementRow>,
}

impl MeasurementSeries {
    pub fn new(rows: Vec<MeasurementRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MeasurementRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: MeasurementRow) {
        self.rows.push(row);
    }

    pub fn first(&self) -> Option<&MeasurementRow> {
        self.rows.first()
    }

    /// Every raw field of every row must be a finite number.
    pub fn validate(&self) -> MbalResult<()> {
        for (i, row) in self.rows.iter().enumerate() {
            if let Some((name, value)) = row.fields().into_iter().find(|(_, v)| !v.is_finite()) {
                return Err(MbalError::invalid(format!(
                    "row {i}: field {name} is not a finite number ({value})"
                )));
            }
        }
        Ok(())
    }
}

impl From<Vec<MeasurementRow>> for MeasurementSeries {
    fn from(rows: Vec<MeasurementRow>) -> Self {
        Self::new(rows)
    }
}

impl FromIterator<MeasurementRow> for MeasurementSeries {
    fn from_iter<I: IntoIterator<Item = MeasurementRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
