pub mod completion;
pub mod gate;
pub mod init;
pub mod protocol;
pub mod render;
pub mod stop;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use completion::{extract_recommended_command, run_completion};
pub use gate::{decide_agent_invocation, decide_transition, run_gate, GateDecision};
pub use init::{parse_command, run_init};
pub use protocol::{parse_event, HookOutcome, EXIT_ALLOW, EXIT_BLOCK};
pub use stop::run_stop;
pub use workspace::{find_vcs_root, resolve_workspace_root};

use crate::config::{HookEnv, Settings};
use crate::control::{WorkflowControl, WorkflowState};
use crate::metadata::MetadataResolver;
use crate::session::{parse_session_id, SessionStore};
use crate::shared::errors::SessionError;
use crate::shared::ids::SessionId;
use crate::shared::logging::HookLog;

/// Everything one interceptor invocation reads from its surroundings.
pub struct HookContext<'a> {
    pub env: &'a HookEnv,
    pub settings: &'a Settings,
    pub control: &'a dyn WorkflowControl,
    pub sessions: SessionStore,
    pub log: &'a HookLog,
}

impl<'a> HookContext<'a> {
    pub fn new(
        env: &'a HookEnv,
        settings: &'a Settings,
        control: &'a dyn WorkflowControl,
        log: &'a HookLog,
    ) -> Self {
        Self {
            env,
            settings,
            control,
            sessions: SessionStore::new(&env.workflows_root),
            log,
        }
    }

    pub fn metadata(&self) -> MetadataResolver<'a> {
        MetadataResolver::new(self.settings, self.env.plugin_root.as_deref())
    }

    /// Environment session id first, then the one carried by the event.
    pub fn session_source<'e>(&'e self, payload_session: Option<&'e str>) -> Option<&'e str> {
        self.env
            .session_id
            .as_deref()
            .or(payload_session)
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
    }

    pub fn session_id(
        &self,
        payload_session: Option<&str>,
    ) -> Result<Option<SessionId>, SessionError> {
        self.session_source(payload_session)
            .map(parse_session_id)
            .transpose()
    }

    /// Tracked workflow for the session; any local problem reads as none.
    pub fn current_workflow_id(&self, payload_session: Option<&str>) -> Option<String> {
        let session = match self.session_id(payload_session) {
            Ok(session) => session?,
            Err(err) => {
                self.log.warn("invalid_session", &err.to_string());
                return None;
            }
        };
        match self.sessions.read_pointer(&session) {
            Ok(pointer) => pointer.map(|p| p.workflow_id),
            Err(err) => {
                self.log.warn("pointer_unreadable", &err.to_string());
                None
            }
        }
    }

    /// Latest daemon snapshot for the session's workflow, or none when there is
    /// nothing tracked or the daemon cannot answer.
    pub fn active_state(&self, payload_session: Option<&str>) -> Option<WorkflowState> {
        let workflow_id = self.current_workflow_id(payload_session)?;
        self.control.get_status(&workflow_id).ok()
    }

    pub fn required_agent(&self, state: &WorkflowState) -> Option<String> {
        state
            .required_agent
            .as_deref()
            .map(str::trim)
            .filter(|agent| !agent.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.metadata()
                    .resolve_agent(&state.current_phase, Some(&state.command))
                    .map(str::to_string)
            })
    }

    /// Phase-start context for a freshly created workflow.
    pub fn start_context(&self, state: &WorkflowState, session: Option<&SessionId>) -> String {
        let required_agent = self.required_agent(state);
        let skill = self
            .metadata()
            .skill_injection(&state.current_phase, Some(&state.command));
        render::start_context(
            state,
            self.settings,
            session.map(SessionId::as_str),
            required_agent.as_deref(),
            skill.as_deref(),
        )
    }
}
