//! Typed configuration structs, loaded once from the environment.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::env_keys::{observability as obv_keys, paths as path_keys, ports as port_keys};
use super::loader::{env_bool, env_optional, env_or};
use crate::ConfigError;

pub const DEFAULT_BACKEND_PORT: u16 = 8000;
pub const DEFAULT_FRONTEND_PORT: u16 = 8080;

pub const VENV_DIR_NAME: &str = ".venv";
pub const BACKEND_DIR_NAME: &str = "backend";
pub const MANIFEST_FILE_NAME: &str = "requirements.txt";
pub const FRONTEND_DIR_NAME: &str = "FRONTEND";
pub const CLIMATE_DATASET_FILE: &str = "IGP_EstacionEMA_2018-2024_Dataset.xlsx - Worksheet.csv";
pub const SOIL_DATASET_FILE: &str = "soil_huancayo_sintetico_50kv.2.xlsx - Sheet1.csv";

/// What this invocation does after provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Sanity validation, then exit
    Setup,
    /// uvicorn with live reload
    Backend,
    /// Static file server over the frontend assets
    Frontend,
}

impl Mode {
    /// `setup` takes precedence over `frontend`.
    pub fn from_flags(setup: bool, frontend: bool) -> Self {
        if setup {
            Self::Setup
        } else if frontend {
            Self::Frontend
        } else {
            Self::Backend
        }
    }
}

/// Resolved bind ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortConfig {
    pub backend: u16,
    pub frontend: u16,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND_PORT,
            frontend: DEFAULT_FRONTEND_PORT,
        }
    }
}

impl PortConfig {
    /// Priority: CLI flag > environment value > default.
    pub fn resolve_one(
        flag: Option<u16>,
        env_key: &str,
        env_value: Option<&str>,
        default: u16,
    ) -> Result<u16, ConfigError> {
        if let Some(port) = flag {
            return Ok(port);
        }
        match env_value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                key: env_key.to_string(),
                value: raw.to_string(),
            }),
            None => Ok(default),
        }
    }

    /// Resolve both ports, reading `PORT` / `FRONTEND_PORT` once.
    pub fn from_env(backend_flag: Option<u16>, frontend_flag: Option<u16>) -> Result<Self, ConfigError> {
        let backend_env = env_optional(port_keys::PORT, &[]);
        let frontend_env = env_optional(port_keys::FRONTEND_PORT, &[]);
        Ok(Self {
            backend: Self::resolve_one(
                backend_flag,
                port_keys::PORT,
                backend_env.as_deref(),
                DEFAULT_BACKEND_PORT,
            )?,
            frontend: Self::resolve_one(
                frontend_flag,
                port_keys::FRONTEND_PORT,
                frontend_env.as_deref(),
                DEFAULT_FRONTEND_PORT,
            )?,
        })
    }
}

/// A dataset file the backend expects, checked for presence only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    /// Human-readable label used in diagnostics, e.g. `clima`
    pub label: String,
    pub path: PathBuf,
}

impl DatasetRef {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }

    /// Pure existence predicate; the file is never opened.
    pub fn is_present(&self) -> bool {
        self.path.exists()
    }
}

/// Filesystem layout of an AgroFuturo checkout.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
    /// Isolated environment root
    pub venv_dir: PathBuf,
    /// Dependency manifest consumed by pip
    pub manifest: PathBuf,
    /// Backend source tree (byte-compiled during setup)
    pub backend_dir: PathBuf,
    /// Static frontend assets
    pub frontend_dir: PathBuf,
    pub datasets: Vec<DatasetRef>,
    /// Explicit seed interpreter; `None` means search `PATH`
    pub seed_python: Option<PathBuf>,
}

impl ProjectLayout {
    /// Default layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let backend_dir = root.join(BACKEND_DIR_NAME);
        Self {
            venv_dir: root.join(VENV_DIR_NAME),
            manifest: backend_dir.join(MANIFEST_FILE_NAME),
            frontend_dir: root.join(FRONTEND_DIR_NAME),
            datasets: vec![
                DatasetRef::new("clima", root.join(CLIMATE_DATASET_FILE)),
                DatasetRef::new("suelo", root.join(SOIL_DATASET_FILE)),
            ],
            backend_dir,
            seed_python: None,
            root,
        }
    }

    /// Override the venv directory; relative paths are taken from the root.
    pub fn with_venv_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.venv_dir = if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.root.join(dir)
        };
        self
    }

    pub fn with_seed_python(mut self, python: impl Into<PathBuf>) -> Self {
        self.seed_python = Some(python.into());
        self
    }

    /// Discover the root and apply `AGROFUTURO_VENV_DIR` / `AGROFUTURO_PYTHON`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let root_override = env_optional(path_keys::AGROFUTURO_ROOT, &[]);
        let root = crate::discovery::project_root_from_cwd(root_override.as_deref())?;
        let mut layout = Self::new(root);
        if let Some(venv) = env_optional(path_keys::AGROFUTURO_VENV_DIR, &[]) {
            layout = layout.with_venv_dir(venv);
        }
        if let Some(python) = env_optional(path_keys::AGROFUTURO_PYTHON, path_keys::PYTHON_ALIASES) {
            layout = layout.with_seed_python(python);
        }
        Ok(layout)
    }
}

/// Everything one invocation needs; built once in `main` and passed down.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub mode: Mode,
    pub ports: PortConfig,
    pub layout: ProjectLayout,
    /// Both `--setup` and `--frontend` were given; the latter is ignored.
    pub frontend_flag_ignored: bool,
}

impl LaunchConfig {
    pub fn new(setup: bool, frontend: bool, ports: PortConfig, layout: ProjectLayout) -> Self {
        Self {
            mode: Mode::from_flags(setup, frontend),
            ports,
            layout,
            frontend_flag_ignored: setup && frontend,
        }
    }

    /// Build from CLI flags plus the environment (loads `.env` first).
    pub fn from_env(
        setup: bool,
        frontend: bool,
        port: Option<u16>,
        frontend_port: Option<u16>,
    ) -> Result<Self, ConfigError> {
        super::loader::load_dotenv();
        let ports = PortConfig::from_env(port, frontend_port)?;
        let layout = ProjectLayout::from_env()?;
        Ok(Self::new(setup, frontend, ports, layout))
    }
}

/// quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::AGROFUTURO_QUIET, &[], false),
                log_level: env_or(obv_keys::AGROFUTURO_LOG_LEVEL, &[], || {
                    "agrofuturo=info".to_string()
                }),
                log_json: env_bool(obv_keys::AGROFUTURO_LOG_JSON, &[], false),
                audit_log: env_optional(obv_keys::AGROFUTURO_AUDIT_LOG, &[]),
            }
        })
    }
}
