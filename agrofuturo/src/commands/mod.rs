//! Dispatch: provision the venv, then run setup or launch one server.

pub mod serve;
pub mod setup;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use agrofuturo_core::config::LaunchConfig;
use agrofuturo_core::observability;
use agrofuturo_runtime::{BootstrapError, LaunchTarget};

use crate::cli::Cli;

/// The three things an invocation can do, in the order dispatch calls them.
pub trait Orchestrator {
    fn provision(&mut self, cfg: &LaunchConfig) -> Result<PathBuf>;
    fn setup(&mut self, cfg: &LaunchConfig, python: &Path) -> Result<()>;
    fn serve(&mut self, target: LaunchTarget, cfg: &LaunchConfig, python: &Path) -> Result<()>;
}

/// Runs real child processes.
pub struct LiveOrchestrator;

impl Orchestrator for LiveOrchestrator {
    fn provision(&mut self, cfg: &LaunchConfig) -> Result<PathBuf> {
        agrofuturo_runtime::ensure_environment(&cfg.layout)
            .context("Environment provisioning failed")
    }

    fn setup(&mut self, cfg: &LaunchConfig, python: &Path) -> Result<()> {
        setup::cmd_setup(cfg, python)
    }

    fn serve(&mut self, target: LaunchTarget, cfg: &LaunchConfig, python: &Path) -> Result<()> {
        serve::cmd_serve(target, cfg, python)
    }
}

/// Provision unconditionally, then setup (if requested) or exactly one server.
pub fn dispatch(cfg: &LaunchConfig, orchestrator: &mut impl Orchestrator) -> Result<()> {
    if cfg.frontend_flag_ignored {
        tracing::warn!("--frontend is ignored when --setup is given");
    }
    let python = orchestrator.provision(cfg)?;
    match LaunchTarget::from_config(cfg) {
        None => orchestrator.setup(cfg, &python),
        Some(target) => orchestrator.serve(target, cfg, &python),
    }
}

/// Entry point from `main`.
pub fn run(cli: Cli) -> Result<()> {
    let cfg = LaunchConfig::from_env(cli.setup, cli.frontend, cli.port, cli.frontend_port)
        .context("Invalid configuration")?;
    tracing::debug!(
        mode = ?cfg.mode,
        backend_port = cfg.ports.backend,
        frontend_port = cfg.ports.frontend,
        root = %cfg.layout.root.display(),
        "Resolved launch configuration"
    );
    observability::audit_invocation_started(cfg.mode, cfg.ports, &cfg.layout.root);
    dispatch(&cfg, &mut LiveOrchestrator)
}

/// Exit code for a failed invocation: the failing child's code when known.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<BootstrapError>()
        .map_or(1, BootstrapError::exit_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrofuturo_core::config::{PortConfig, ProjectLayout};
    use agrofuturo_runtime::Step;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Provision,
        Setup,
        Serve(LaunchTarget),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        fail_provision: bool,
    }

    impl Orchestrator for Recorder {
        fn provision(&mut self, _cfg: &LaunchConfig) -> Result<PathBuf> {
            self.calls.push(Call::Provision);
            if self.fail_provision {
                return Err(BootstrapError::StepFailed {
                    step: Step::InstallRequirements,
                    code: Some(2),
                })
                .context("Environment provisioning failed");
            }
            Ok(PathBuf::from("/p/.venv/bin/python"))
        }

        fn setup(&mut self, _cfg: &LaunchConfig, _python: &Path) -> Result<()> {
            self.calls.push(Call::Setup);
            Ok(())
        }

        fn serve(&mut self, target: LaunchTarget, _cfg: &LaunchConfig, _python: &Path) -> Result<()> {
            self.calls.push(Call::Serve(target));
            Ok(())
        }
    }

    fn cfg(setup: bool, frontend: bool) -> LaunchConfig {
        LaunchConfig::new(
            setup,
            frontend,
            PortConfig {
                backend: 8001,
                frontend: 8081,
            },
            ProjectLayout::new("/p"),
        )
    }

    fn calls_for(setup: bool, frontend: bool) -> Vec<Call> {
        let mut rec = Recorder::default();
        dispatch(&cfg(setup, frontend), &mut rec).unwrap();
        rec.calls
    }

    #[test]
    fn test_setup_never_serves() {
        assert_eq!(calls_for(true, false), vec![Call::Provision, Call::Setup]);
        assert_eq!(calls_for(true, true), vec![Call::Provision, Call::Setup]);
    }

    #[test]
    fn test_default_serves_backend() {
        assert_eq!(
            calls_for(false, false),
            vec![Call::Provision, Call::Serve(LaunchTarget::Backend { port: 8001 })]
        );
    }

    #[test]
    fn test_frontend_flag_serves_frontend() {
        assert_eq!(
            calls_for(false, true),
            vec![Call::Provision, Call::Serve(LaunchTarget::Frontend { port: 8081 })]
        );
    }

    #[test]
    fn test_provision_failure_stops_dispatch() {
        let mut rec = Recorder {
            fail_provision: true,
            ..Default::default()
        };
        let err = dispatch(&cfg(false, false), &mut rec).unwrap_err();
        assert_eq!(rec.calls, vec![Call::Provision]);
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let err = anyhow::anyhow!("boom");
        assert_eq!(exit_code(&err), 1);
        let missing: anyhow::Error = BootstrapError::ManifestMissing(PathBuf::from("/p/req.txt")).into();
        assert_eq!(exit_code(&missing), 1);
    }
}
