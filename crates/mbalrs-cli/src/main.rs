mod cmd;
mod csv_parse;
mod report;

use crate::cmd::cli::Cli;

use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // logs go to stderr so stdout stays clean for --json
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = match cli.into_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        },
    };
    if let Err(e) = cfg.run() {
        eprintln!("{e}");
        process::exit(1);
    }
}
