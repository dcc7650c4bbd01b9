use super::protocol::{parse_event, HookOutcome, StopEvent};
use super::HookContext;
use crate::config::Settings;

pub fn stop_block_reason(reason: &str, settings: &Settings) -> String {
    let reason = match reason.trim() {
        "" => "the workflow daemon reports unfinished phases",
        reason => reason,
    };
    format!(
        "Cannot stop: {reason}\n\n\
         The workflow is incomplete. Please either:\n\
         1. Complete the current phase by invoking the required agent and calling {}\n\
         2. Cancel the workflow explicitly\n",
        settings.transition_tool
    )
}

pub fn run_stop(ctx: &HookContext<'_>, raw: &str) -> HookOutcome {
    let event: StopEvent = parse_event(raw).unwrap_or_default();
    let Some(workflow_id) = ctx.current_workflow_id(event.session_id.as_deref()) else {
        return HookOutcome::Allow;
    };
    let verdict = ctx.control.can_stop(&workflow_id);
    if verdict.can_stop {
        return HookOutcome::Allow;
    }
    ctx.log.info(
        "stop_blocked",
        &format!("workflow_id={workflow_id} reason={}", verdict.reason),
    );
    HookOutcome::block(stop_block_reason(&verdict.reason, ctx.settings))
}
