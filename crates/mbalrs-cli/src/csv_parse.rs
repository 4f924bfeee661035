use mbalrs_core::{InitialParameters, MbalError, MeasurementRow, MeasurementSeries};

use itertools::Itertools;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const PRODUCTION_COLUMNS: [&str; 6] = ["p", "Np", "Gp", "Bo", "Bg", "Rs"];
pub const REQUIRED_PARAMETERS: [&str; 3] = ["Boi", "Bgi", "Rsi"];

#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("production table is missing the required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("initial table needs 'Parameter' and 'Value' columns")]
    MissingParameterColumns,
    #[error("initial table is missing the required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<String>),
    #[error("initial parameter {name} must be numeric, got '{value}'")]
    NotNumeric { name: String, value: String },
    #[error("Swc, Cf and Cw must be given together, missing: {}", .0.join(", "))]
    IncompleteCompressibility(Vec<String>),
    #[error(transparent)]
    Invalid(#[from] MbalError),
}

/// A production row that could not be read as numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProductionTable {
    pub series: MeasurementSeries,
    pub skipped: Vec<SkippedRow>,
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
}

/// Reads the production table.
///
/// Header names are trimmed, columns with no value in any row are ignored and
/// rows with a non-numeric required cell are skipped.
pub fn read_production<R: Read>(reader: R) -> Result<ProductionTable, IngestError> {
    let mut rdr = reader_builder().from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_owned()).collect();
    let records: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>()?;

    let is_empty_column = |idx: usize| {
        records.iter().all(|r| r.get(idx).map(|c| c.trim().is_empty()).unwrap_or(true))
    };
    let live_headers: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| if is_empty_column(i) { String::new() } else { h.clone() })
        .collect();

    let mut columns = Vec::with_capacity(PRODUCTION_COLUMNS.len());
    let mut missing = Vec::new();
    for name in PRODUCTION_COLUMNS {
        match find_column(&live_headers, name) {
            Some(idx) => columns.push(idx),
            None => missing.push(name.to_owned()),
        }
    }
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns(missing));
    }

    let mut table = ProductionTable::default();
    for record in &records {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let values: Result<Vec<f64>, String> = columns
            .iter()
            .zip(PRODUCTION_COLUMNS)
            .map(|(&idx, name)| {
                let cell = record.get(idx).unwrap_or("");
                parse_number(cell).ok_or_else(|| format!("{name} is not numeric: '{cell}'"))
            })
            .collect();
        match values {
            Ok(v) => table.series.push(MeasurementRow::new(v[0], v[1], v[2], v[3], v[4], v[5])),
            Err(reason) => {
                tracing::warn!(line, %reason, "skipping production row");
                table.skipped.push(SkippedRow { line, reason });
            },
        }
    }
    Ok(table)
}

/// Reads `Parameter,Value` rows. Parameter names are matched case-insensitively.
pub fn read_initial<R: Read>(reader: R) -> Result<InitialParameters, IngestError> {
    let mut rdr = reader_builder().from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_owned()).collect();
    let (Some(name_col), Some(value_col)) =
        (find_column(&headers, "Parameter"), find_column(&headers, "Value"))
    else {
        return Err(IngestError::MissingParameterColumns);
    };

    let mut raw: HashMap<String, (String, String)> = HashMap::new();
    for record in rdr.records() {
        let record = record?;
        let name = record.get(name_col).unwrap_or("").trim();
        if name.is_empty() {
            continue;
        }
        let value = record.get(value_col).unwrap_or("").trim();
        raw.insert(name.to_ascii_lowercase(), (name.to_owned(), value.to_owned()));
    }

    let lookup = |name: &str| -> Result<Option<f64>, IngestError> {
        match raw.get(&name.to_ascii_lowercase()) {
            None => Ok(None),
            Some((given, value)) => parse_number(value).map(Some).ok_or_else(|| {
                IngestError::NotNumeric { name: given.clone(), value: value.clone() }
            }),
        }
    };

    let missing: Vec<String> = REQUIRED_PARAMETERS
        .iter()
        .filter(|name| !raw.contains_key(&name.to_ascii_lowercase()))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::MissingParameters(missing));
    }

    let (Some(boi), Some(bgi), Some(rsi)) = (lookup("Boi")?, lookup("Bgi")?, lookup("Rsi")?) else {
        return Err(IngestError::MissingParameters(
            REQUIRED_PARAMETERS.iter().map(|s| s.to_string()).collect(),
        ));
    };
    let mut params = InitialParameters::new(boi, bgi, rsi)?;

    let compressibility = [("Swc", lookup("Swc")?), ("Cf", lookup("Cf")?), ("Cw", lookup("Cw")?)];
    match compressibility {
        [(_, Some(swc)), (_, Some(cf)), (_, Some(cw))] => {
            params = params.with_compressibility(swc, cf, cw)?;
        },
        [(_, None), (_, None), (_, None)] => {},
        partial => {
            return Err(IngestError::IncompleteCompressibility(
                partial
                    .iter()
                    .filter(|(_, v)| v.is_none())
                    .map(|(n, _)| n.to_string())
                    .collect_vec(),
            ));
        },
    }

    if let Some(pi) = lookup("Pi")? {
        params = params.with_initial_pressure(pi)?;
    }
    Ok(params)
}

pub fn read_production_file<P: AsRef<Path>>(path: P) -> Result<ProductionTable, IngestError> {
    read_production(File::open(path)?)
}

pub fn read_initial_file<P: AsRef<Path>>(path: P) -> Result<InitialParameters, IngestError> {
    read_initial(File::open(path)?)
}
