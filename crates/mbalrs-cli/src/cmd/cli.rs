use clap::{Args, Parser, Subcommand, ValueHint};
use glob::glob;
use std::path::PathBuf;

use crate::cmd::config::{Action, Analyze as AnalyzeCfg, Batch as BatchCfg, CmdError, Config};

use mbalrs_core::{
    AnalysisConfig, ConfigError, DegenerateR2, FitWindowPolicy, FormulationVariant, NoGasCapRefit,
    WithdrawalConvention,
};

#[derive(Debug, Parser)]
#[command(
    name = "mbalrs",
    about = "Havlena-Odeh material balance for gas-cap oil reservoirs",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze one production/initial table pair
    Analyze(AnalyzeArgs),

    /// Analyze every dataset directory matched by the inputs
    Batch(BatchArgs),
}

/* ------------------- analysis options ------------------- */

#[derive(Debug, Args, Default)]
pub struct AnalysisArgs {
    /// TOML file with analysis settings, flags below override it
    #[arg(short = 'c', long = "config", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// simple or extended (default picks from the initial parameters)
    #[arg(short = 'f', long)]
    pub formulation: Option<FormulationVariant>,

    /// Fit window: all, top or top-N
    #[arg(short = 'w', long, conflicts_with = "top_k")]
    pub window: Option<FitWindowPolicy>,

    /// Fit only the N highest pressure rows
    #[arg(short = 'k', long = "top-k", value_name = "N")]
    pub top_k: Option<usize>,

    /// Withdrawal term of the extended formulation: from-initial or total
    #[arg(long)]
    pub withdrawal: Option<WithdrawalConvention>,

    /// N when no gas cap is found: keep or refit
    #[arg(long = "no-gas-cap")]
    pub no_gas_cap: Option<NoGasCapRefit>,

    /// R2 when no gas cap is found: fixed or recompute
    #[arg(long = "degenerate-r2")]
    pub degenerate_r2: Option<DegenerateR2>,
}

impl AnalysisArgs {
    /// Settings from the config file (or defaults) with the flags applied on top.
    pub fn resolve(&self) -> Result<AnalysisConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => AnalysisConfig::from_toml_file(path)?,
            None => AnalysisConfig::default(),
        };
        Ok(self.apply(base))
    }

    fn apply(&self, mut cfg: AnalysisConfig) -> AnalysisConfig {
        if let Some(f) = self.formulation {
            cfg.formulation = Some(f);
        }
        if let Some(w) = self.window {
            cfg.window = w;
        }
        if let Some(k) = self.top_k {
            cfg.window = FitWindowPolicy::TopKByPressure(k);
        }
        if let Some(w) = self.withdrawal {
            cfg.withdrawal = w;
        }
        if let Some(r) = self.no_gas_cap {
            cfg.no_gas_cap_refit = r;
        }
        if let Some(r) = self.degenerate_r2 {
            cfg.degenerate_r2 = r;
        }
        cfg
    }
}

/* ----------------------- analyze ----------------------- */

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Production table CSV (p, Np, Gp, Bo, Bg, Rs)
    #[arg(short = 'p', long, value_hint = ValueHint::FilePath)]
    pub production: PathBuf,

    /// Initial parameters CSV (Parameter, Value)
    #[arg(short = 'i', long, value_hint = ValueHint::FilePath)]
    pub initial: PathBuf,

    /// Write the per-row table to this CSV file
    #[arg(short = 't', long, value_hint = ValueHint::FilePath)]
    pub table: Option<PathBuf>,

    /// Print the result as JSON instead of the summary
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

/* ------------------------ batch ------------------------ */

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Dataset directories or glob patterns (quote the pattern), each holding
    /// production.csv and initial.csv
    #[arg(num_args = 1..,
        value_hint = ValueHint::DirPath,
        required = true,
        short = 'i', long = "inputs",
        value_name = "Dataset dirs")]
    pub inputs: Vec<String>,

    /// Write mbal_table.csv into each dataset directory
    #[arg(long = "write-tables")]
    pub write_tables: bool,

    /// Print the results as one JSON array
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub analysis: AnalysisArgs,
}

impl BatchArgs {
    /// Expand `inputs` into dataset directories.
    pub fn resolve_dirs(&self) -> Vec<PathBuf> {
        let mut out = Vec::new();

        for inp in &self.inputs {
            if inp.contains('*') || inp.contains('?') || inp.contains('[') {
                match glob(inp) {
                    Ok(paths) => out.extend(paths.filter_map(Result::ok).filter(|p| p.is_dir())),
                    Err(e) => tracing::warn!("invalid glob '{inp}': {e}"),
                }
            } else {
                out.push(PathBuf::from(inp));
            }
        }

        out
    }
}

// -------- Map CLI -> Config/Action --------

impl Cli {
    pub fn into_config(self) -> Result<Config, CmdError> {
        let action = match self.command {
            Commands::Analyze(a) => Action::Analyze(AnalyzeCfg {
                analysis: a.analysis.resolve()?,
                production: a.production,
                initial: a.initial,
                table: a.table,
                json: a.json,
            }),
            Commands::Batch(b) => {
                let datasets = b.resolve_dirs();
                if datasets.is_empty() {
                    return Err(CmdError::Msg(format!(
                        "no dataset directories matched {}",
                        b.inputs.join(" ")
                    )));
                }
                Action::Batch(BatchCfg {
                    analysis: b.analysis.resolve()?,
                    datasets,
                    write_tables: b.write_tables,
                    json: b.json,
                })
            },
        };
        Ok(Config { action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze_with_overrides() {
        let cli = Cli::try_parse_from([
            "mbalrs",
            "analyze",
            "-p",
            "prod.csv",
            "-i",
            "init.csv",
            "--formulation",
            "extended",
            "--top-k",
            "4",
            "--no-gas-cap",
            "refit",
        ])
        .unwrap();
        let cfg = cli.into_config().unwrap();
        let Action::Analyze(a) = cfg.action else { panic!("expected analyze") };
        assert_eq!(a.production, PathBuf::from("prod.csv"));
        assert_eq!(a.analysis.formulation, Some(FormulationVariant::Extended));
        assert_eq!(a.analysis.window, FitWindowPolicy::TopKByPressure(4));
        assert_eq!(a.analysis.no_gas_cap_refit, NoGasCapRefit::LeastSquares);
        assert_eq!(a.analysis.degenerate_r2, DegenerateR2::Fixed);
        assert!(!a.json);
    }

    #[test]
    fn window_and_top_k_conflict() {
        let res = Cli::try_parse_from([
            "mbalrs", "analyze", "-p", "a.csv", "-i", "b.csv", "-w", "all", "-k", "3",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn rejects_unknown_formulation() {
        let res = Cli::try_parse_from([
            "mbalrs",
            "analyze",
            "-p",
            "a.csv",
            "-i",
            "b.csv",
            "--formulation",
            "fancy",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn flags_override_config_file_values() {
        let base = AnalysisConfig::from_toml_str(
            "window = \"top-6\"\nwithdrawal = \"total\"\ndegenerate_r2 = \"recompute\"",
        )
        .unwrap();
        let args = AnalysisArgs {
            window: Some(FitWindowPolicy::AllPoints),
            degenerate_r2: Some(DegenerateR2::Fixed),
            ..Default::default()
        };
        let cfg = args.apply(base);
        assert_eq!(cfg.window, FitWindowPolicy::AllPoints);
        assert_eq!(cfg.degenerate_r2, DegenerateR2::Fixed);
        // untouched by flags
        assert_eq!(cfg.withdrawal, WithdrawalConvention::Total);
    }

    #[test]
    fn batch_takes_many_inputs() {
        let args = ["mbalrs", "batch", "-i", "a", "b", "c", "--write-tables"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Commands::Batch(b) = cli.command else { panic!("expected batch") };
        assert_eq!(b.inputs, vec!["a", "b", "c"]);
        assert!(b.write_tables);
        assert_eq!(b.resolve_dirs().len(), 3);
    }

    #[test]
    fn missing_config_file_is_error() {
        let args = AnalysisArgs {
            config: Some(PathBuf::from("/nonexistent/mbalrs.toml")),
            ..Default::default()
        };
        assert!(matches!(args.resolve(), Err(ConfigError::Io(_))));
    }
}
