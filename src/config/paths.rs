use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const DEFAULT_WORKFLOWS_DIR: &str = ".claude/local/workflows";
pub const SETTINGS_FILE_NAME: &str = "hooks.yaml";
pub const HOOK_LOG_FILE_NAME: &str = "hooks.log";
pub const SESSION_POINTER_FILE_NAME: &str = "current.json";
pub const SKILLS_DIR: &str = "skills";
pub const SKILL_FILE_NAME: &str = "SKILL.md";

pub fn default_workflows_root(home: Option<&str>) -> Result<PathBuf, ConfigError> {
    let home = home
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(DEFAULT_WORKFLOWS_DIR))
}

pub fn settings_file_path(plugin_root: &Path) -> PathBuf {
    plugin_root.join(SETTINGS_FILE_NAME)
}

pub fn skill_file_path(plugin_root: &Path, skill: &str) -> PathBuf {
    plugin_root.join(SKILLS_DIR).join(skill).join(SKILL_FILE_NAME)
}

pub fn session_pointer_path(workflows_root: &Path, session_id: &str) -> PathBuf {
    workflows_root
        .join(session_id)
        .join(SESSION_POINTER_FILE_NAME)
}

/// Expands a leading `~` and anchors relative paths at `cwd`.
pub fn expand_path(raw: &str, home: Option<&str>, cwd: &Path) -> PathBuf {
    let expanded = match (raw.strip_prefix('~'), home) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            PathBuf::from(format!("{home}{rest}"))
        }
        _ => PathBuf::from(raw),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_path_handles_tilde_and_relative_inputs() {
        let cwd = Path::new("/work/repo");
        assert_eq!(
            expand_path("~/projects/app", Some("/home/dev"), cwd),
            PathBuf::from("/home/dev/projects/app")
        );
        assert_eq!(
            expand_path("~", Some("/home/dev"), cwd),
            PathBuf::from("/home/dev")
        );
        assert_eq!(
            expand_path("sub/dir", Some("/home/dev"), cwd),
            PathBuf::from("/work/repo/sub/dir")
        );
        assert_eq!(
            expand_path("~other/x", Some("/home/dev"), cwd),
            PathBuf::from("/work/repo/~other/x")
        );
    }

    #[test]
    fn default_workflows_root_requires_home() {
        assert!(matches!(
            default_workflows_root(None),
            Err(ConfigError::HomeDirectoryUnavailable)
        ));
        assert_eq!(
            default_workflows_root(Some("/home/dev")).expect("root"),
            PathBuf::from("/home/dev/.claude/local/workflows")
        );
    }
}
