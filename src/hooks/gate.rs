use super::protocol::{
    parse_event, AgentInvocationInput, HookOutcome, PreToolUseEvent, TransitionInput,
};
use super::HookContext;
use crate::config::Settings;
use crate::control::{PhaseStatus, WorkflowState, EVENT_AGENT_STARTED};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// The required agent is being started; the start is recorded as an event.
    AllowAgentStart { agent: String },
    Block(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GatedTool {
    AgentInvocation,
    Transition,
    LegacyTransition,
}

fn classify_tool(tool_name: &str, settings: &Settings) -> Option<GatedTool> {
    let tool_name = tool_name.trim();
    if tool_name == settings.agent_tool {
        Some(GatedTool::AgentInvocation)
    } else if tool_name == settings.transition_tool {
        Some(GatedTool::Transition)
    } else if tool_name == settings.legacy_transition_tool {
        Some(GatedTool::LegacyTransition)
    } else {
        None
    }
}

fn bare_agent<'a>(settings: &Settings, agent: &'a str) -> &'a str {
    let agent = agent.trim();
    settings.owned_agent_name(agent).unwrap_or(agent)
}

/// Only the first call for an `agent_required` phase is restricted.
pub fn decide_agent_invocation(
    state: &WorkflowState,
    settings: &Settings,
    required_agent: Option<&str>,
    subagent_type: &str,
) -> GateDecision {
    if state.phase_status != PhaseStatus::AgentRequired {
        return GateDecision::Allow;
    }
    let Some(required) = required_agent.map(|agent| bare_agent(settings, agent)) else {
        return GateDecision::Allow;
    };
    let attempted = bare_agent(settings, subagent_type);
    if attempted == required {
        return GateDecision::AllowAgentStart {
            agent: required.to_string(),
        };
    }
    let attempted = if subagent_type.trim().is_empty() {
        "(none)"
    } else {
        subagent_type.trim()
    };
    GateDecision::Block(format!(
        "Phase {phase} requires {required} agent. Got: {attempted}. You MUST invoke {namespaced} first.",
        phase = state.current_phase,
        namespaced = settings.namespaced_agent(required),
    ))
}

/// Local checks only; the daemon still validates evidence and conditions.
pub fn decide_transition(state: &WorkflowState, to_phase: Option<&str>) -> GateDecision {
    let target = to_phase.map(str::trim).unwrap_or_default();
    if target.is_empty() || !state.allows_transition_to(target) {
        let allowed = if state.allowed_next_phases.is_empty() {
            "none".to_string()
        } else {
            state.allowed_next_phases.join(", ")
        };
        let target = if target.is_empty() { "(none)" } else { target };
        return GateDecision::Block(format!(
            "Invalid transition from {} to {target}. Allowed next phases: {allowed}",
            state.current_phase
        ));
    }
    if state.phase_status != PhaseStatus::AgentComplete {
        let status = match state.phase_status.as_str() {
            "" => "unknown",
            status => status,
        };
        return GateDecision::Block(format!(
            "Phase {} is not ready for transition. Current status: {status}. Complete the required agent first.",
            state.current_phase
        ));
    }
    GateDecision::Allow
}

pub fn run_gate(ctx: &HookContext<'_>, raw: &str) -> HookOutcome {
    let Some(event) = parse_event::<PreToolUseEvent>(raw) else {
        return HookOutcome::Allow;
    };
    let Some(tool) = classify_tool(&event.tool_name, ctx.settings) else {
        return HookOutcome::Allow;
    };
    let Some(state) = ctx.active_state(event.session_id.as_deref()) else {
        return HookOutcome::Allow;
    };

    let decision = match tool {
        GatedTool::LegacyTransition => GateDecision::Block(format!(
            "{} is provided via MCP. Use {}.",
            ctx.settings.legacy_transition_tool, ctx.settings.transition_tool
        )),
        GatedTool::AgentInvocation => {
            let input: AgentInvocationInput = event.input();
            let required = ctx.required_agent(&state);
            decide_agent_invocation(
                &state,
                ctx.settings,
                required.as_deref(),
                &input.subagent_type,
            )
        }
        GatedTool::Transition => {
            let input: TransitionInput = event.input();
            decide_transition(&state, input.to_phase.as_deref())
        }
    };

    match decision {
        GateDecision::Allow => HookOutcome::Allow,
        GateDecision::AllowAgentStart { agent } => {
            if !ctx.control.record_agent_event(
                &state.workflow_id,
                EVENT_AGENT_STARTED,
                &state.current_phase,
                Some(&agent),
            ) {
                ctx.log.warn(
                    "agent_start_unrecorded",
                    &format!("workflow_id={} agent={agent}", state.workflow_id),
                );
            }
            HookOutcome::Allow
        }
        GateDecision::Block(reason) => {
            ctx.log.info(
                "tool_blocked",
                &format!("workflow_id={} tool={}", state.workflow_id, event.tool_name),
            );
            HookOutcome::Block { reason }
        }
    }
}
