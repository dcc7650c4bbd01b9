use crate::config::ConfigError;
use std::path::{Path, PathBuf};

const VCS_MARKERS: &[&str] = &[".git", ".hg", ".jj"];

/// Explicit override, else the nearest enclosing repository root, else `cwd`.
pub fn resolve_workspace_root(
    override_root: Option<&Path>,
    cwd: &Path,
) -> Result<PathBuf, ConfigError> {
    let root = match override_root {
        Some(root) => root.to_path_buf(),
        None => find_vcs_root(cwd).unwrap_or_else(|| cwd.to_path_buf()),
    };
    if !root.is_dir() {
        return Err(ConfigError::InvalidWorkspaceRoot {
            path: root.display().to_string(),
        });
    }
    Ok(root)
}

pub fn find_vcs_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| VCS_MARKERS.iter().any(|marker| dir.join(marker).exists()))
        .map(Path::to_path_buf)
}
