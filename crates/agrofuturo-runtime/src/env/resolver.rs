//! Where a venv keeps its interpreter.

use std::path::{Path, PathBuf};

/// Platform families with distinct venv layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFamily {
    /// `Scripts\python.exe`
    Windows,
    /// `bin/python`
    Posix,
}

impl PlatformFamily {
    /// Family of the platform this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

/// Interpreter path inside `venv_dir`. Pure: nothing needs to exist.
pub fn venv_python(venv_dir: &Path, family: PlatformFamily) -> PathBuf {
    match family {
        PlatformFamily::Windows => venv_dir.join("Scripts").join("python.exe"),
        PlatformFamily::Posix => venv_dir.join("bin").join("python"),
    }
}

/// A venv root together with the layout it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Venv {
    pub dir: PathBuf,
    pub family: PlatformFamily,
}

impl Venv {
    pub fn new(dir: impl Into<PathBuf>, family: PlatformFamily) -> Self {
        Self {
            dir: dir.into(),
            family,
        }
    }

    pub fn exists(&self) -> bool {
        self.dir.exists()
    }

    pub fn python(&self) -> PathBuf {
        venv_python(&self.dir, self.family)
    }
}
