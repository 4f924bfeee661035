use crate::csv_parse::{read_initial_file, read_production_file, IngestError, ProductionTable};
use crate::report::{print_summary, write_json, write_table};

use mbalrs_core::{run_analysis, AnalysisConfig, ConfigError, MaterialBalanceResult, MbalError};

use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

pub const PRODUCTION_FILE: &str = "production.csv";
pub const INITIAL_FILE: &str = "initial.csv";
pub const TABLE_FILE: &str = "mbal_table.csv";

/* =================== Public configuration types =================== */

#[derive(Debug)]
pub struct Config {
    pub action: Action,
}

#[derive(Debug, Clone)]
pub enum Action {
    Analyze(Analyze),
    Batch(Batch),
}

#[derive(Debug, Clone)]
pub struct Analyze {
    pub production: PathBuf,
    pub initial: PathBuf,
    pub analysis: AnalysisConfig,
    pub table: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct Batch {
    pub datasets: Vec<PathBuf>,
    pub analysis: AnalysisConfig,
    pub write_tables: bool,
    pub json: bool,
}

/* =================== Error type (no process::exit) =================== */

#[derive(thiserror::Error, Debug)]
pub enum CmdError {
    #[error("{0}")]
    Ingest(#[from] IngestError),
    #[error("analysis failed: {0}")]
    Analysis(#[from] MbalError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Msg(String),
}

/* =================== Datasets =================== */

/// One analyzed production/initial table pair.
#[derive(Debug)]
pub struct DatasetReport {
    pub name: String,
    pub table: ProductionTable,
    pub result: MaterialBalanceResult,
}

pub fn analyze_dataset(
    name: &str,
    production: &Path,
    initial: &Path,
    cfg: &AnalysisConfig,
) -> Result<DatasetReport, CmdError> {
    let params = read_initial_file(initial)?;
    let table = read_production_file(production)?;
    tracing::debug!(dataset = name, rows = table.series.len(), "production table read");
    let result = run_analysis(&params, &table.series, cfg)?;
    Ok(DatasetReport { name: name.to_owned(), table, result })
}

fn dataset_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

#[derive(Serialize)]
struct BatchEntry<'a> {
    dataset: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a MaterialBalanceResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/* =================== Entry point =================== */

impl Config {
    pub fn run(&mut self) -> Result<(), CmdError> {
        match &self.action {
            Action::Analyze(a) => run_analyze(a),
            Action::Batch(b) => run_batch(b),
        }
    }
}

/* =================== Actions =================== */

fn run_analyze(a: &Analyze) -> Result<(), CmdError> {
    let name = a.production.display().to_string();
    let report = analyze_dataset(&name, &a.production, &a.initial, &a.analysis)?;

    if a.json {
        write_json(&report.result, io::stdout().lock())?;
        println!();
    } else {
        print_summary(&report.name, &report.result, &report.table.series, &report.table.skipped);
    }
    if let Some(path) = &a.table {
        write_table(&report.result, BufWriter::new(File::create(path)?))?;
        tracing::info!("wrote table to {}", path.display());
    }
    Ok(())
}

fn run_batch(b: &Batch) -> Result<(), CmdError> {
    tracing::info!(datasets = b.datasets.len(), "starting batch");

    // results come back in input order
    let outcomes: Vec<(String, Result<DatasetReport, CmdError>)> = b
        .datasets
        .par_iter()
        .map(|dir| {
            let name = dataset_name(dir);
            let outcome = analyze_dataset(
                &name,
                &dir.join(PRODUCTION_FILE),
                &dir.join(INITIAL_FILE),
                &b.analysis,
            )
            .and_then(|report| {
                if b.write_tables {
                    let file = File::create(dir.join(TABLE_FILE))?;
                    write_table(&report.result, BufWriter::new(file))?;
                }
                Ok(report)
            });
            (name, outcome)
        })
        .collect();

    let mut failed = 0;
    for (name, outcome) in &outcomes {
        match outcome {
            Ok(report) if !b.json => {
                print_summary(name, &report.result, &report.table.series, &report.table.skipped);
                println!();
            },
            Ok(_) => {},
            Err(e) => {
                failed += 1;
                tracing::error!(dataset = %name, "{e}");
            },
        }
    }

    if b.json {
        let entries: Vec<BatchEntry> = outcomes
            .iter()
            .map(|(name, outcome)| match outcome {
                Ok(report) => {
                    BatchEntry { dataset: name, result: Some(&report.result), error: None }
                },
                Err(e) => BatchEntry { dataset: name, result: None, error: Some(e.to_string()) },
            })
            .collect();
        serde_json::to_writer_pretty(io::stdout().lock(), &entries)?;
        println!();
    }

    if failed > 0 {
        return Err(CmdError::Msg(format!("{failed} of {} datasets failed", outcomes.len())));
    }
    Ok(())
}
