use super::HookContext;
use crate::config::{HookEnv, Settings};
use crate::control::{
    CanStopResult, ControlError, EventRequest, InitRequest, TransitionRequest, TransitionResult,
    WorkflowControl, WorkflowState,
};
use crate::session::{parse_session_id, SessionStore};
use crate::shared::logging::HookLog;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use tempfile::TempDir;

/// In-memory daemon that records every call it receives.
#[derive(Default)]
pub struct FakeControl {
    pub init_replies: RefCell<VecDeque<WorkflowState>>,
    pub status: RefCell<Option<WorkflowState>>,
    pub can_stop_reply: RefCell<Option<CanStopResult>>,
    pub record_ok: bool,
    pub inits: RefCell<Vec<InitRequest>>,
    pub status_calls: RefCell<Vec<String>>,
    pub transitions: RefCell<Vec<TransitionRequest>>,
    pub events: RefCell<Vec<EventRequest>>,
}

impl FakeControl {
    pub fn with_status(state: WorkflowState) -> Self {
        Self {
            status: RefCell::new(Some(state)),
            record_ok: true,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn push_init(&self, state: WorkflowState) {
        self.init_replies.borrow_mut().push_back(state);
    }

    fn down(path: &str) -> ControlError {
        ControlError::Transport {
            url: format!("fake://{path}"),
            reason: "connection refused".to_string(),
        }
    }
}

impl WorkflowControl for FakeControl {
    fn init_workflow(&self, request: &InitRequest) -> Result<WorkflowState, ControlError> {
        self.inits.borrow_mut().push(request.clone());
        self.init_replies
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Self::down("workflow/init"))
    }

    fn get_status(&self, workflow_id: &str) -> Result<WorkflowState, ControlError> {
        self.status_calls.borrow_mut().push(workflow_id.to_string());
        self.status
            .borrow()
            .clone()
            .ok_or_else(|| Self::down("workflow/status"))
    }

    fn transition(&self, request: &TransitionRequest) -> TransitionResult {
        self.transitions.borrow_mut().push(request.clone());
        TransitionResult::failed("fake daemon does not transition")
    }

    fn can_stop(&self, _workflow_id: &str) -> CanStopResult {
        self.can_stop_reply
            .borrow()
            .clone()
            .unwrap_or_else(|| CanStopResult::allowed("Daemon check failed: connection refused"))
    }

    fn record_event(&self, request: &EventRequest) -> bool {
        self.events.borrow_mut().push(request.clone());
        self.record_ok
    }
}

/// Temp workflows root plus an environment pointing at it.
pub struct Fixture {
    pub dir: TempDir,
    pub env: HookEnv,
    pub settings: Settings,
    pub log: HookLog,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let workspace = dir.path().join("repo");
        std::fs::create_dir_all(workspace.join(".git")).expect("workspace");
        let env = HookEnv {
            session_id: Some("sess-1".to_string()),
            workspace_root_override: None,
            engine_url: "http://127.0.0.1:1".to_string(),
            workflows_root: dir.path().join("workflows"),
            plugin_root: Some(dir.path().join("plugin")),
            log_path: dir.path().join("workflows/hooks.log"),
            cwd: workspace,
        };
        Self {
            dir,
            env,
            settings: Settings::default(),
            log: HookLog::disabled("test"),
        }
    }

    pub fn context<'a>(&'a self, control: &'a dyn WorkflowControl) -> HookContext<'a> {
        HookContext::new(&self.env, &self.settings, control, &self.log)
    }

    pub fn track(&self, workflow_id: &str) {
        let session = parse_session_id("sess-1").expect("session");
        SessionStore::new(&self.env.workflows_root)
            .write_pointer(&session, workflow_id, None)
            .expect("pointer");
    }

    pub fn tracked(&self) -> Option<String> {
        let session = parse_session_id("sess-1").expect("session");
        SessionStore::new(&self.env.workflows_root).current_workflow_id(&session)
    }

    pub fn write_skill(&self, skill: &str, body: &str) -> PathBuf {
        let dir = self.dir.path().join("plugin/skills").join(skill);
        std::fs::create_dir_all(&dir).expect("skill dir");
        let path = dir.join("SKILL.md");
        std::fs::write(&path, body).expect("skill");
        path
    }
}

pub fn workflow(command: &str, phases: &[&str], current: &str) -> WorkflowState {
    WorkflowState {
        workflow_id: format!("wf-{command}"),
        command: command.to_string(),
        workflow_type: command.to_string(),
        phases: phases.iter().map(|p| p.to_string()).collect(),
        current_phase: current.to_string(),
        ..WorkflowState::default()
    }
}
