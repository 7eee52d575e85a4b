//! Launch exactly one long-running server and block until it exits.
//!
//! Ctrl+C reaches the child through the terminal's process group. The
//! parent installs a handler so it outlives the signal and can wait for the
//! child; a shutdown that follows an interrupt counts as success.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use agrofuturo_core::config::{LaunchConfig, Mode, ProjectLayout};

use crate::error::BootstrapError;
use crate::step::{check_status, Step, StepCommand};

/// ASGI application served by uvicorn.
pub const BACKEND_APP: &str = "backend.main:app";

/// Which server to run, with its bind port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchTarget {
    Backend { port: u16 },
    Frontend { port: u16 },
}

impl LaunchTarget {
    /// The server for this configuration; `None` in setup mode.
    pub fn from_config(cfg: &LaunchConfig) -> Option<Self> {
        match cfg.mode {
            Mode::Setup => None,
            Mode::Backend => Some(Self::Backend {
                port: cfg.ports.backend,
            }),
            Mode::Frontend => Some(Self::Frontend {
                port: cfg.ports.frontend,
            }),
        }
    }

    pub fn port(&self) -> u16 {
        match *self {
            Self::Backend { port } | Self::Frontend { port } => port,
        }
    }

    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port())
    }

    /// Line printed before the server starts.
    pub fn banner(&self) -> String {
        match self {
            Self::Backend { .. } => format!("Backend en {} (docs en /docs)", self.url()),
            Self::Frontend { .. } => format!("Frontend en {}", self.url()),
        }
    }

    /// Command line for this server using the venv interpreter.
    pub fn command(&self, python: &Path, layout: &ProjectLayout) -> StepCommand {
        match *self {
            Self::Backend { port } => StepCommand::new(Step::ServeBackend, python, &layout.root)
                .args(["-m", "uvicorn", BACKEND_APP, "--reload", "--port"])
                .arg(port.to_string()),
            Self::Frontend { port } => StepCommand::new(Step::ServeFrontend, python, &layout.root)
                .args(["-m", "http.server"])
                .arg(port.to_string())
                .arg("--directory")
                .arg(&layout.frontend_dir),
        }
    }
}

/// Print the banner, run the server, and wait for it to exit.
pub fn launch(
    target: LaunchTarget,
    python: &Path,
    layout: &ProjectLayout,
) -> Result<(), BootstrapError> {
    if matches!(target, LaunchTarget::Frontend { .. }) && !layout.frontend_dir.is_dir() {
        return Err(BootstrapError::PathMissing {
            what: "Frontend directory",
            path: layout.frontend_dir.clone(),
        });
    }
    let cmd = target.command(python, layout);
    cmd.validate()?;

    println!("{}", target.banner());

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    }) {
        tracing::warn!("Failed to set Ctrl+C handler: {}", e);
    }

    let started = Instant::now();
    let mut child = cmd.spawn()?;
    let status = cmd.wait(&mut child, started)?;

    if interrupted.load(Ordering::SeqCst) {
        tracing::info!(exit_code = ?status.code(), "{} stopped after interrupt", cmd.step);
        return Ok(());
    }
    check_status(cmd.step, status)
}
