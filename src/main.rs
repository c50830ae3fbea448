mod app;
mod cli;
mod color;
mod config;
mod data;
mod error;
mod report;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use app::ProteoCompareApp;
use cli::Cli;
use config::Thresholds;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .format_timestamp(None)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let thresholds = Thresholds::resolve(cli.thresholds.as_deref(), cli.threshold_overrides())
        .context("resolving thresholds")?;
    log::info!("Using thresholds {thresholds:?}");

    let app = ProteoCompareApp::new(thresholds, cli.report_config());
    let summary = app
        .run(&cli.input)
        .with_context(|| format!("analyzing {}", cli.input.display()))?;

    println!(
        "{} proteins kept ({} clinically relevant), {} excluded for high variation",
        summary.table.len(),
        summary.table.clinically_relevant().count(),
        summary.excluded.len()
    );
    for path in &summary.artifacts {
        println!("  {}", path.display());
    }
    Ok(())
}
