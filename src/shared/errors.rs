#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("workflow daemon request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("workflow daemon returned status {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },
    #[error("workflow daemon response from {url} could not be decoded: {reason}")]
    Decode { url: String, reason: String },
    #[error("workflow daemon reports no active workflow")]
    NoActiveWorkflow,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid session id `{raw}`: {reason}")]
    InvalidSessionId { raw: String, reason: String },
    #[error("failed to read session pointer {path}: {source}")]
    ReadPointer {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse session pointer {path}: {source}")]
    ParsePointer {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to create session directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write session pointer {path}: {source}")]
    WritePointer {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
