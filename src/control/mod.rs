pub mod client;
pub mod types;

pub use crate::shared::errors::ControlError;
pub use client::{ControlClient, MUTATE_TIMEOUT, READ_TIMEOUT};
pub use types::{
    CanStopResult, EventRequest, InitRequest, PhaseStatus, TransitionRequest, TransitionResult,
    WorkflowState, EVENT_AGENT_COMPLETED, EVENT_AGENT_STARTED,
};

use serde_json::Map;

/// Typed surface of the workflow daemon.
///
/// `init_workflow` and `get_status` report every failure as an `Err`, which
/// callers treat as "daemon unavailable". The remaining calls never fail:
/// they resolve to their documented defaults instead.
pub trait WorkflowControl {
    fn init_workflow(&self, request: &InitRequest) -> Result<WorkflowState, ControlError>;

    fn get_status(&self, workflow_id: &str) -> Result<WorkflowState, ControlError>;

    /// Transport failures come back as `success=false` with a diagnostic.
    fn transition(&self, request: &TransitionRequest) -> TransitionResult;

    /// Fails open: an unreachable daemon answers `can_stop=true`.
    fn can_stop(&self, workflow_id: &str) -> CanStopResult;

    /// Logging only; never advances a phase.
    fn record_event(&self, request: &EventRequest) -> bool;

    fn record_agent_event(
        &self,
        workflow_id: &str,
        event_type: &str,
        phase: &str,
        agent: Option<&str>,
    ) -> bool {
        self.record_event(&EventRequest {
            workflow_id: workflow_id.to_string(),
            event_type: event_type.to_string(),
            phase: phase.to_string(),
            agent: agent.map(str::to_string),
            data: Map::new(),
        })
    }
}
