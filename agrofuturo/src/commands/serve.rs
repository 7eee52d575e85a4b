//! Backend / frontend server launch.

use std::path::Path;

use anyhow::{Context, Result};
use agrofuturo_core::config::LaunchConfig;
use agrofuturo_runtime::LaunchTarget;

pub fn cmd_serve(target: LaunchTarget, cfg: &LaunchConfig, python: &Path) -> Result<()> {
    agrofuturo_runtime::launch(target, python, &cfg.layout)
        .with_context(|| format!("Server on port {} exited with an error", target.port()))
}
