use crate::config::paths::session_pointer_path;
use crate::shared::errors::SessionError;
use crate::shared::fs_atomic::atomic_write_json;
use crate::shared::ids::SessionId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// `<workflows_root>/<session_id>/current.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentWorkflowPointer {
    pub workflow_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    workflows_root: PathBuf,
}

impl SessionStore {
    pub fn new(workflows_root: impl Into<PathBuf>) -> Self {
        Self {
            workflows_root: workflows_root.into(),
        }
    }

    pub fn pointer_path(&self, session: &SessionId) -> PathBuf {
        session_pointer_path(&self.workflows_root, session.as_str())
    }

    pub fn read_pointer(
        &self,
        session: &SessionId,
    ) -> Result<Option<CurrentWorkflowPointer>, SessionError> {
        let path = self.pointer_path(session);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::ReadPointer {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let pointer: CurrentWorkflowPointer =
            serde_json::from_str(&raw).map_err(|source| SessionError::ParsePointer {
                path: path.display().to_string(),
                source,
            })?;
        if pointer.workflow_id.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(pointer))
    }

    /// Workflow id for the session; unreadable pointers count as none.
    pub fn current_workflow_id(&self, session: &SessionId) -> Option<String> {
        self.read_pointer(session)
            .ok()
            .flatten()
            .map(|pointer| pointer.workflow_id)
    }

    pub fn write_pointer(
        &self,
        session: &SessionId,
        workflow_id: &str,
        command: Option<&str>,
    ) -> Result<PathBuf, SessionError> {
        let path = self.pointer_path(session);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SessionError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let pointer = CurrentWorkflowPointer {
            workflow_id: workflow_id.to_string(),
            command: command.map(str::to_string),
            updated_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        atomic_write_json(&path, &pointer).map_err(|source| SessionError::WritePointer {
            path: path.display().to_string(),
            source,
        })?;
        Ok(path)
    }
}

pub fn parse_session_id(raw: &str) -> Result<SessionId, SessionError> {
    SessionId::parse(raw.trim()).map_err(|reason| SessionError::InvalidSessionId {
        raw: raw.to_string(),
        reason,
    })
}
