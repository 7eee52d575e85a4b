//! Bootstrap errors.
//!
//! Everything here is fatal for the invocation; there is no retry and no
//! cleanup. A half-created venv is left for the next run to reuse.

use std::path::PathBuf;
use thiserror::Error;

use crate::step::Step;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("No Python interpreter found to create the venv (tried {tried}); set AGROFUTURO_PYTHON")]
    SeedInterpreterNotFound { tried: String },

    #[error("Failed to start {step} ({program}): {source}")]
    Spawn {
        step: Step,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for {step}: {source}")]
    Wait {
        step: Step,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} failed ({})", describe_exit(.code))]
    StepFailed { step: Step, code: Option<i32> },

    #[error("venv python not found at {}", .expected.display())]
    InterpreterMissing { expected: PathBuf },

    #[error("Dependency manifest not found: {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("{what} not found: {}", .path.display())]
    PathMissing { what: &'static str, path: PathBuf },

    #[error("Sanity probe printed no summary line (last output: {0:?})")]
    ProbeOutput(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}

impl BootstrapError {
    /// Process exit code for this failure: the child's own code when it has one.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StepFailed { code: Some(c), .. } if *c != 0 => *c,
            _ => 1,
        }
    }
}
