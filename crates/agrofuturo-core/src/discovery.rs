//! Project root discovery.
//!
//! The project root is the directory holding `backend/requirements.txt`.
//! `AGROFUTURO_ROOT` wins; otherwise the nearest ancestor of the working
//! directory that contains the manifest is used, falling back to the working
//! directory itself.

use std::path::{Path, PathBuf};

use crate::config::schema::{BACKEND_DIR_NAME, MANIFEST_FILE_NAME};
use crate::ConfigError;

/// Walk `start` and its ancestors, returning the first that holds the manifest.
pub fn discover_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(BACKEND_DIR_NAME).join(MANIFEST_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}

/// Resolve the project root from an explicit override or by discovery from `cwd`.
pub fn resolve_project_root(override_root: Option<&str>, cwd: &Path) -> PathBuf {
    if let Some(root) = override_root {
        let root = PathBuf::from(root);
        return if root.is_absolute() { root } else { cwd.join(root) };
    }
    match discover_project_root(cwd) {
        Some(root) => {
            tracing::debug!(root = %root.display(), "Discovered project root");
            root
        }
        None => {
            tracing::debug!(cwd = %cwd.display(), "No manifest above cwd; using cwd as project root");
            cwd.to_path_buf()
        }
    }
}

/// Same as [`resolve_project_root`], starting from the process working directory.
pub fn project_root_from_cwd(override_root: Option<&str>) -> Result<PathBuf, ConfigError> {
    let cwd = std::env::current_dir().map_err(ConfigError::RootUnavailable)?;
    Ok(resolve_project_root(override_root, &cwd))
}
