//! Create the project venv and converge it on the dependency manifest.
//!
//! Idempotent: an existing venv is reused, but pip is upgraded and the
//! manifest installed on every run.

use std::path::{Path, PathBuf};

use agrofuturo_core::config::ProjectLayout;

use super::resolver::{PlatformFamily, Venv};
use crate::error::BootstrapError;
use crate::info_log;
use crate::step::{Step, StepCommand};

/// Interpreter names searched on `PATH` when no seed is configured.
pub const SEED_CANDIDATES: &[&str] = &["python3", "python"];

/// The interpreter used to create the venv: the configured one, else the
/// first of [`SEED_CANDIDATES`] found on `PATH`.
pub fn find_seed_python(explicit: Option<&Path>) -> Result<PathBuf, BootstrapError> {
    if let Some(python) = explicit {
        return Ok(python.to_path_buf());
    }
    SEED_CANDIDATES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| BootstrapError::SeedInterpreterNotFound {
            tried: SEED_CANDIDATES.join(", "),
        })
}

/// `<seed> -m venv <venv_dir>`
pub fn create_venv_command(seed: &Path, venv_dir: &Path, root: &Path) -> StepCommand {
    StepCommand::new(Step::CreateVenv, seed, root)
        .args(["-m", "venv"])
        .arg(venv_dir)
}

/// `<python> -m pip install --upgrade pip`
pub fn upgrade_pip_command(python: &Path, root: &Path) -> StepCommand {
    StepCommand::new(Step::UpgradePip, python, root).args(["-m", "pip", "install", "--upgrade", "pip"])
}

/// `<python> -m pip install -r <manifest>`
pub fn install_requirements_command(python: &Path, manifest: &Path, root: &Path) -> StepCommand {
    StepCommand::new(Step::InstallRequirements, python, root)
        .args(["-m", "pip", "install", "-r"])
        .arg(manifest)
}

/// Ensure the venv exists with the manifest installed; return its interpreter.
pub fn ensure_environment(layout: &ProjectLayout) -> Result<PathBuf, BootstrapError> {
    ensure_environment_for(layout, PlatformFamily::host())
}

/// [`ensure_environment`] for an explicit platform layout.
pub fn ensure_environment_for(
    layout: &ProjectLayout,
    family: PlatformFamily,
) -> Result<PathBuf, BootstrapError> {
    if !layout.manifest.is_file() {
        return Err(BootstrapError::ManifestMissing(layout.manifest.clone()));
    }

    let venv = Venv::new(&layout.venv_dir, family);
    if venv.exists() {
        info_log!("Reusing venv at {}", venv.dir.display());
    } else {
        let seed = find_seed_python(layout.seed_python.as_deref())?;
        info_log!(
            "Creating venv at {} with {}",
            venv.dir.display(),
            seed.display()
        );
        create_venv_command(&seed, &venv.dir, &layout.root).run()?;
    }

    let python = venv.python();
    if !python.exists() {
        return Err(BootstrapError::InterpreterMissing { expected: python });
    }

    upgrade_pip_command(&python, &layout.root).run()?;
    install_requirements_command(&python, &layout.manifest, &layout.root).run()?;
    tracing::debug!(python = %python.display(), "Environment ready");
    Ok(python)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn project(root: &Path) -> ProjectLayout {
        let backend = root.join("backend");
        fs::create_dir_all(&backend).unwrap();
        fs::write(backend.join("requirements.txt"), "fastapi\n").unwrap();
        ProjectLayout::new(root)
    }

    #[test]
    fn test_command_wiring() {
        let root = Path::new("/srv/agro");
        let python = Path::new("/srv/agro/.venv/bin/python");
        let create = create_venv_command(Path::new("python3"), Path::new("/srv/agro/.venv"), root);
        assert_eq!(create.step, Step::CreateVenv);
        assert_eq!(create.display_args(), vec!["-m", "venv", "/srv/agro/.venv"]);
        assert_eq!(create.cwd, root);

        let upgrade = upgrade_pip_command(python, root);
        assert_eq!(upgrade.program, python);
        assert_eq!(
            upgrade.display_args(),
            vec!["-m", "pip", "install", "--upgrade", "pip"]
        );

        let install =
            install_requirements_command(python, Path::new("/srv/agro/backend/requirements.txt"), root);
        assert_eq!(
            install.display_args(),
            vec!["-m", "pip", "install", "-r", "/srv/agro/backend/requirements.txt"]
        );
    }

    #[test]
    fn test_explicit_seed_is_used_verbatim() {
        let seed = find_seed_python(Some(Path::new("/opt/python3.12/bin/python3"))).unwrap();
        assert_eq!(seed, Path::new("/opt/python3.12/bin/python3"));
    }

    #[test]
    fn test_missing_manifest_fails_first() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(tmp.path());
        match ensure_environment(&layout).unwrap_err() {
            BootstrapError::ManifestMissing(path) => assert_eq!(path, layout.manifest),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!layout.venv_dir.exists());
    }

    #[test]
    fn test_existing_venv_without_interpreter_fails_loudly() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = project(tmp.path());
        fs::create_dir_all(&layout.venv_dir).unwrap();
        match ensure_environment_for(&layout, PlatformFamily::Posix).unwrap_err() {
            BootstrapError::InterpreterMissing { expected } => {
                assert_eq!(expected, layout.venv_dir.join("bin").join("python"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    mod fake_python {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Shell script standing in for Python: logs its arguments and, for
        /// `-m venv <dir>`, lays out `<dir>/bin/python` (a copy of itself)
        /// unless `creates_interpreter` is false.
        pub(super) fn write_fake_python(dir: &Path, log: &Path, creates_interpreter: bool) -> PathBuf {
            let venv_body = if creates_interpreter {
                "  mkdir -p \"$3/bin\"\n  cp \"$0\" \"$3/bin/python\"\n  chmod +x \"$3/bin/python\"\n"
            } else {
                "  mkdir -p \"$3\"\n"
            };
            let script = format!(
                "#!/bin/sh\necho \"$0 $*\" >> '{}'\nif [ \"$1\" = \"-m\" ] && [ \"$2\" = \"venv\" ]; then\n{}fi\nexit 0\n",
                log.display(),
                venv_body
            );
            let path = dir.join("fake-python");
            fs::write(&path, script).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn read_log(log: &Path) -> Vec<String> {
            fs::read_to_string(log)
                .unwrap_or_default()
                .lines()
                .map(String::from)
                .collect()
        }

        #[test]
        fn test_provisioning_is_idempotent() {
            let tmp = tempfile::tempdir().unwrap();
            let tools = tempfile::tempdir().unwrap();
            let log = tools.path().join("calls.log");
            let seed = write_fake_python(tools.path(), &log, true);
            let layout = project(tmp.path()).with_seed_python(&seed);

            let first = ensure_environment_for(&layout, PlatformFamily::Posix).unwrap();
            assert_eq!(first, layout.venv_dir.join("bin").join("python"));
            let calls = read_log(&log);
            assert_eq!(calls.len(), 3, "calls: {calls:?}");
            assert!(calls[0].contains("-m venv"));
            assert!(calls[1].ends_with("-m pip install --upgrade pip"));
            assert!(calls[2].contains("-m pip install -r"));

            let second = ensure_environment_for(&layout, PlatformFamily::Posix).unwrap();
            assert_eq!(second, first);
            let calls = read_log(&log);
            assert_eq!(calls.len(), 5, "calls: {calls:?}");
            assert!(calls[3].ends_with("-m pip install --upgrade pip"));
            assert!(calls[4].contains("-m pip install -r"));
            assert!(!calls[3..].iter().any(|c| c.contains("-m venv")));
        }

        #[test]
        fn test_creation_without_interpreter_names_expected_path() {
            let tmp = tempfile::tempdir().unwrap();
            let tools = tempfile::tempdir().unwrap();
            let log = tools.path().join("calls.log");
            let seed = write_fake_python(tools.path(), &log, false);
            let layout = project(tmp.path()).with_seed_python(&seed);

            let err = ensure_environment_for(&layout, PlatformFamily::Posix).unwrap_err();
            let expected = layout.venv_dir.join("bin").join("python");
            assert!(err.to_string().contains(&expected.display().to_string()));
            assert!(matches!(err, BootstrapError::InterpreterMissing { .. }));
            // pip never ran
            assert_eq!(read_log(&log).len(), 1);
        }

        #[test]
        fn test_failing_seed_aborts() {
            let tmp = tempfile::tempdir().unwrap();
            let tools = tempfile::tempdir().unwrap();
            let seed = tools.path().join("broken-python");
            fs::write(&seed, "#!/bin/sh\nexit 9\n").unwrap();
            fs::set_permissions(&seed, fs::Permissions::from_mode(0o755)).unwrap();
            let layout = project(tmp.path()).with_seed_python(&seed);

            let err = ensure_environment_for(&layout, PlatformFamily::Posix).unwrap_err();
            assert!(matches!(
                err,
                BootstrapError::StepFailed { step: Step::CreateVenv, code: Some(9) }
            ));
            assert_eq!(err.exit_code(), 9);
        }
    }
}
