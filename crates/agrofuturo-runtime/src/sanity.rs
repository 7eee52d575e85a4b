//! Setup-time sanity validation.
//!
//! 1. byte-compile the backend tree (`compileall -q`), failing on syntax errors;
//! 2. run [`PROBE_SOURCE`] with `python -c` from the project root. It imports
//!    `load_climate`/`load_soil` and `build_zone_graph`, calls them and prints
//!    `Sanity OK: clima=<rows> filas, distritos_suelo=<nodes>`;
//! 3. report which dataset files are missing (warnings only).

use std::io::{self, Write};
use std::path::Path;
use std::sync::OnceLock;

use agrofuturo_core::config::{DatasetRef, ProjectLayout};
use regex::Regex;

use crate::error::BootstrapError;
use crate::info_log;
use crate::step::{Step, StepCommand};

/// Runtime probe, passed to the venv interpreter as a single `-c` argument.
///
/// Only the collaborator contracts are relied on: `load_climate()` returns a
/// 2-tuple whose first item has a length, `load_soil()` a 3-tuple whose second
/// item is grouped by district, and `build_zone_graph` an object with `nodes`.
pub const PROBE_SOURCE: &str = r#"from backend.data_loader import load_climate, load_soil
from backend.graph import build_zone_graph
climate_df, _ = load_climate()
_, soil_grouped, _ = load_soil()
graph = build_zone_graph(soil_grouped)
print(f"Sanity OK: clima={len(climate_df)} filas, distritos_suelo={len(graph.nodes)}")
"#;

/// Printed when every dataset file exists.
pub const DATASETS_PRESENT_MSG: &str = "Datasets presentes.";

/// Counts reported by the sanity entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanityReport {
    /// Rows in the climate table returned by `load_climate()`
    pub climate_rows: u64,
    /// Nodes in the graph built from the grouped soil data
    pub soil_districts: u64,
}

fn summary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Sanity OK: clima=(\d+) filas, distritos_suelo=(\d+)")
            .expect("sanity summary regex is valid")
    })
}

impl SanityReport {
    /// Parse the last summary line in the probe output.
    pub fn parse(output: &str) -> Option<Self> {
        let caps = summary_regex().captures_iter(output).last()?;
        Some(Self {
            climate_rows: caps[1].parse().ok()?,
            soil_districts: caps[2].parse().ok()?,
        })
    }
}

/// Result of a completed setup validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanityOutcome {
    pub report: SanityReport,
    /// Datasets that were not found; non-fatal
    pub missing_datasets: Vec<DatasetRef>,
}

/// `<python> -m compileall -q <backend_dir>`
pub fn compile_command(python: &Path, backend_dir: &Path, root: &Path) -> StepCommand {
    StepCommand::new(Step::CompileBackend, python, root)
        .args(["-m", "compileall", "-q"])
        .arg(backend_dir)
}

/// `<python> -c <PROBE_SOURCE>`, run from the project root so `backend` is importable.
pub fn probe_command(python: &Path, root: &Path) -> StepCommand {
    StepCommand::new(Step::SanityProbe, python, root).args(["-c", PROBE_SOURCE])
}

/// Datasets from `datasets` whose file does not exist.
pub fn missing_datasets(datasets: &[DatasetRef]) -> Vec<DatasetRef> {
    datasets.iter().filter(|d| !d.is_present()).cloned().collect()
}

/// Write dataset diagnostics: one line per missing file to `err`, or the
/// all-present message to `out`.
pub fn report_datasets(
    missing: &[DatasetRef],
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<()> {
    if missing.is_empty() {
        writeln!(out, "{}", DATASETS_PRESENT_MSG)?;
    } else {
        for dataset in missing {
            writeln!(
                err,
                "Falta dataset de {}: {}",
                dataset.label,
                dataset.path.display()
            )?;
        }
    }
    Ok(())
}

/// Run the full setup validation inside the venv at `python`.
pub fn run_sanity(layout: &ProjectLayout, python: &Path) -> Result<SanityOutcome, BootstrapError> {
    if !layout.backend_dir.is_dir() {
        return Err(BootstrapError::PathMissing {
            what: "Backend source tree",
            path: layout.backend_dir.clone(),
        });
    }

    info_log!("Byte-compiling {}", layout.backend_dir.display());
    compile_command(python, &layout.backend_dir, &layout.root).run()?;

    let output = probe_command(python, &layout.root).run_captured()?;
    let report = SanityReport::parse(&output).ok_or_else(|| {
        BootstrapError::ProbeOutput(
            output
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("")
                .to_string(),
        )
    })?;
    info_log!(
        climate_rows = report.climate_rows,
        soil_districts = report.soil_districts,
        "Sanity probe passed"
    );

    let missing = missing_datasets(&layout.datasets);
    for dataset in &missing {
        tracing::warn!(label = %dataset.label, path = %dataset.path.display(), "Dataset missing");
    }
    // Diagnostics only; a closed stdout/stderr must not fail setup.
    let _ = report_datasets(&missing, &mut io::stdout().lock(), &mut io::stderr().lock());

    Ok(SanityOutcome {
        report,
        missing_datasets: missing,
    })
}
