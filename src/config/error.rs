#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("hook settings validation failed: {0}")]
    Settings(String),
    #[error("failed to resolve home directory for workflows root")]
    HomeDirectoryUnavailable,
    #[error("invalid workspace_root {path}")]
    InvalidWorkspaceRoot { path: String },
    #[error("failed to resolve current directory: {0}")]
    CurrentDirUnavailable(String),
}
