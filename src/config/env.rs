use super::paths::{default_workflows_root, expand_path, HOOK_LOG_FILE_NAME};
use super::ConfigError;
use std::path::{Path, PathBuf};

pub const SESSION_ID_VAR: &str = "CSC_SESSION_ID";
pub const WORKSPACE_ROOT_VAR: &str = "WORKFLOW_WORKSPACE_ROOT";
pub const ENGINE_URL_VAR: &str = "WORKFLOW_ENGINE_URL";
pub const ENGINE_HOST_VAR: &str = "WORKFLOW_ENGINE_HOST";
pub const ENGINE_PORT_VAR: &str = "WORKFLOW_ENGINE_PORT";
pub const MCP_HOST_VAR: &str = "WORKFLOW_MCP_HOST";
pub const MCP_PORT_VAR: &str = "WORKFLOW_MCP_PORT";
pub const LEGACY_MCP_URL_VAR: &str = "FORGE3_MCP_URL";
pub const WORKFLOWS_DIR_VAR: &str = "WORKFLOW_ENGINE_WORKFLOWS_DIR";
pub const PLUGIN_ROOT_VAR: &str = "CLAUDE_PLUGIN_ROOT";
pub const HOOK_LOG_VAR: &str = "WORKFLOW_HOOKS_LOG";

pub const DEFAULT_ENGINE_HOST: &str = "127.0.0.1";
pub const DEFAULT_ENGINE_PORT: u16 = 8765;

/// Process environment as seen by one interceptor invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEnv {
    pub session_id: Option<String>,
    pub workspace_root_override: Option<PathBuf>,
    pub engine_url: String,
    pub workflows_root: PathBuf,
    pub plugin_root: Option<PathBuf>,
    pub log_path: PathBuf,
    pub cwd: PathBuf,
}

impl HookEnv {
    pub fn from_process() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()
            .map_err(|err| ConfigError::CurrentDirUnavailable(err.to_string()))?;
        let exe_plugin_root = std::env::current_exe()
            .ok()
            .and_then(|exe| plugin_root_from_executable(&exe));
        Self::from_lookup(|key| std::env::var(key).ok(), cwd, exe_plugin_root)
    }

    pub fn from_lookup<F>(
        lookup: F,
        cwd: PathBuf,
        exe_plugin_root: Option<PathBuf>,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let home = var("HOME");

        let workflows_root = match var(WORKFLOWS_DIR_VAR) {
            Some(raw) => expand_path(raw.trim(), home.as_deref(), &cwd),
            None => default_workflows_root(home.as_deref())?,
        };
        let log_path = var(HOOK_LOG_VAR)
            .map(|raw| expand_path(raw.trim(), home.as_deref(), &cwd))
            .unwrap_or_else(|| workflows_root.join(HOOK_LOG_FILE_NAME));
        let plugin_root = var(PLUGIN_ROOT_VAR)
            .map(|raw| expand_path(raw.trim(), home.as_deref(), &cwd))
            .or(exe_plugin_root);
        let workspace_root_override =
            var(WORKSPACE_ROOT_VAR).map(|raw| expand_path(raw.trim(), home.as_deref(), &cwd));

        Ok(Self {
            session_id: var(SESSION_ID_VAR).map(|v| v.trim().to_string()),
            workspace_root_override,
            engine_url: resolve_engine_url(&var),
            workflows_root,
            plugin_root,
            log_path,
            cwd,
        })
    }
}

fn resolve_engine_url<F>(var: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = var(ENGINE_URL_VAR) {
        return url.trim().trim_end_matches('/').to_string();
    }
    for (host_key, port_key) in [
        (ENGINE_HOST_VAR, ENGINE_PORT_VAR),
        (MCP_HOST_VAR, MCP_PORT_VAR),
    ] {
        if let (Some(host), Some(port)) = (var(host_key), var(port_key)) {
            return format!("http://{}:{}", host.trim(), port.trim());
        }
    }
    if let Some(url) = var(LEGACY_MCP_URL_VAR) {
        return url.trim().trim_end_matches('/').to_string();
    }
    format!("http://{DEFAULT_ENGINE_HOST}:{DEFAULT_ENGINE_PORT}")
}

/// The binary ships as `<plugin_root>/<bin dir>/phasegate`.
pub fn plugin_root_from_executable(exe: &Path) -> Option<PathBuf> {
    exe.parent()?.parent().map(Path::to_path_buf)
}
