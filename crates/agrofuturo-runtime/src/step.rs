//! Typed child-process descriptors.
//!
//! A [`StepCommand`] names the step, the program, its arguments and the
//! working directory. It is validated before anything is spawned, and all
//! spawn sites share the same status-to-error mapping.

use std::ffi::OsString;
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Instant;

use agrofuturo_core::observability;

use crate::error::BootstrapError;
use crate::info_log;

/// The child invocations this orchestrator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateVenv,
    UpgradePip,
    InstallRequirements,
    CompileBackend,
    SanityProbe,
    ServeBackend,
    ServeFrontend,
}

impl Step {
    /// Stable identifier used in the audit log.
    pub fn id(self) -> &'static str {
        match self {
            Self::CreateVenv => "create_venv",
            Self::UpgradePip => "upgrade_pip",
            Self::InstallRequirements => "install_requirements",
            Self::CompileBackend => "compile_backend",
            Self::SanityProbe => "sanity_probe",
            Self::ServeBackend => "serve_backend",
            Self::ServeFrontend => "serve_frontend",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::CreateVenv => "venv creation",
            Self::UpgradePip => "pip upgrade",
            Self::InstallRequirements => "pip install",
            Self::CompileBackend => "backend byte-compilation",
            Self::SanityProbe => "sanity probe",
            Self::ServeBackend => "backend server",
            Self::ServeFrontend => "frontend server",
        };
        f.write_str(s)
    }
}

/// One child invocation: executable, arguments, working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    pub step: Step,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub cwd: PathBuf,
}

impl StepCommand {
    pub fn new(step: Step, program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            step,
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Arguments as lossy strings, for logs and the audit trail.
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    /// `program arg1 arg2 ...` for diagnostics.
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in self.display_args() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }

    /// A program given as a path (not a bare name resolved through `PATH`)
    /// must exist, and the working directory must be a directory.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        let is_path = self.program.is_absolute() || self.program.components().count() > 1;
        if is_path && !self.program.exists() {
            return Err(BootstrapError::PathMissing {
                what: "Executable",
                path: self.program.clone(),
            });
        }
        if !self.cwd.is_dir() {
            return Err(BootstrapError::PathMissing {
                what: "Working directory",
                path: self.cwd.clone(),
            });
        }
        Ok(())
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.cwd);
        cmd
    }

    fn audit_start(&self) {
        info_log!(step = self.step.id(), "Running: {}", self.command_line());
        observability::audit_step_started(
            self.step.id(),
            &self.program.to_string_lossy(),
            &self.display_args(),
            &self.cwd.to_string_lossy(),
        );
    }

    fn audit_end(&self, status: &ExitStatus, started: Instant) {
        let duration_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(
            step = self.step.id(),
            exit_code = ?status.code(),
            duration_ms,
            "Step finished"
        );
        observability::audit_step_completed(self.step.id(), status.code(), duration_ms);
    }

    fn spawn_error(&self, source: std::io::Error) -> BootstrapError {
        BootstrapError::Spawn {
            step: self.step,
            program: self.program.display().to_string(),
            source,
        }
    }

    /// Run to completion with inherited stdio; non-zero exit is an error.
    pub fn run(&self) -> Result<(), BootstrapError> {
        self.validate()?;
        self.audit_start();
        let started = Instant::now();
        let status = self
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| self.spawn_error(e))?;
        self.audit_end(&status, started);
        check_status(self.step, status)
    }

    /// Run to completion capturing stdout (echoed afterwards); stderr is inherited.
    pub fn run_captured(&self) -> Result<String, BootstrapError> {
        self.validate()?;
        self.audit_start();
        let started = Instant::now();
        let out = self
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| self.spawn_error(e))?;
        self.audit_end(&out.status, started);
        let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
        if !stdout.is_empty() {
            let mut handle = std::io::stdout().lock();
            let _ = handle.write_all(stdout.as_bytes());
            let _ = handle.flush();
        }
        check_status(self.step, out.status)?;
        Ok(stdout)
    }

    /// Spawn with inherited stdio and hand the child back to the caller.
    pub fn spawn(&self) -> Result<Child, BootstrapError> {
        self.validate()?;
        self.audit_start();
        self.command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.spawn_error(e))
    }

    /// Wait for a child obtained from [`StepCommand::spawn`], recording completion.
    pub fn wait(&self, child: &mut Child, started: Instant) -> Result<ExitStatus, BootstrapError> {
        let status = child.wait().map_err(|source| BootstrapError::Wait {
            step: self.step,
            source,
        })?;
        self.audit_end(&status, started);
        Ok(status)
    }
}

/// Map a child's exit status to the uniform step result.
pub fn check_status(step: Step, status: ExitStatus) -> Result<(), BootstrapError> {
    if status.success() {
        Ok(())
    } else {
        Err(BootstrapError::StepFailed {
            step,
            code: status.code(),
        })
    }
}
