//! `agrofuturo --setup`: sanity validation after provisioning.

use std::path::Path;

use anyhow::{Context, Result};
use agrofuturo_core::config::LaunchConfig;

/// Run the sanity validator and print the next-steps hint.
pub fn cmd_setup(cfg: &LaunchConfig, python: &Path) -> Result<()> {
    let outcome = agrofuturo_runtime::run_sanity(&cfg.layout, python)
        .context("Sanity validation failed")?;
    tracing::debug!(
        climate_rows = outcome.report.climate_rows,
        soil_districts = outcome.report.soil_districts,
        missing_datasets = outcome.missing_datasets.len(),
        "Setup complete"
    );
    println!();
    println!("{}", next_steps_hint());
    Ok(())
}

pub fn next_steps_hint() -> String {
    let bin = env!("CARGO_PKG_NAME");
    format!("Listo. Para backend: {bin} | frontend: {bin} --frontend")
}
