use super::protocol::{parse_event, HookOutcome, SubagentStopEvent};
use super::render::completion_context;
use super::workspace::resolve_workspace_root;
use super::HookContext;
use crate::config::{CommandSpec, Settings};
use crate::control::{InitRequest, WorkflowState, EVENT_AGENT_COMPLETED};
use crate::shared::ids::SessionId;
use serde_json::{Map, Value};

pub const AUTO_CHAIN_SOURCE: &str = "auto_chain";

const RECOMMEND_MARKER: &str = "recommend";

const STALE_STATE_WARNING: &str =
    "\nWarning: the workflow daemon did not record this completion. Workflow state may be stale.\n";

fn is_command_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')
}

/// `/name` tokens in `text` that start at a word boundary.
fn slash_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('/').filter_map(move |(idx, _)| {
        let preceded_by_word = text[..idx]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '/');
        if preceded_by_word {
            return None;
        }
        let rest = &text[idx + 1..];
        let end = rest.find(|c| !is_command_char(c)).unwrap_or(rest.len());
        let token = rest[..end].trim_end_matches(':');
        (!token.is_empty()).then_some(token)
    })
}

/// First routable command named after a "recommend" marker in agent output.
///
/// Each marker is searched in the rest of its line and the line after it.
/// Returns `None` when nothing recognizable follows a marker.
pub fn extract_recommended_command<'s>(
    output: &str,
    settings: &'s Settings,
) -> Option<&'s CommandSpec> {
    let lowered = output.to_ascii_lowercase();
    for (idx, _) in lowered.match_indices(RECOMMEND_MARKER) {
        let after = &lowered[idx + RECOMMEND_MARKER.len()..];
        let window_end = after
            .match_indices('\n')
            .nth(1)
            .map(|(end, _)| end)
            .unwrap_or(after.len());
        let found = slash_tokens(&after[..window_end])
            .filter_map(|token| settings.command(token))
            .find(|spec| !spec.dispatcher);
        if found.is_some() {
            return found;
        }
    }
    None
}

fn auto_chain(
    ctx: &HookContext<'_>,
    parent: &WorkflowState,
    recommended: &CommandSpec,
    session: Option<&SessionId>,
) -> Result<String, String> {
    let workspace_root = resolve_workspace_root(
        ctx.env.workspace_root_override.as_deref(),
        &ctx.env.cwd,
    )
    .map_err(|err| err.to_string())?;

    let mut metadata = Map::new();
    metadata.insert("source".to_string(), Value::from(AUTO_CHAIN_SOURCE));
    metadata.insert(
        "parent_workflow_id".to_string(),
        Value::from(parent.workflow_id.as_str()),
    );
    metadata.insert(
        "recommended_command".to_string(),
        Value::from(recommended.name()),
    );
    let request = InitRequest {
        command: recommended.name().to_string(),
        session_id: session.map(|s| s.as_str().to_string()),
        workspace_root: workspace_root.display().to_string(),
        task: parent.task_text().map(str::to_string),
        metadata,
    };
    let state = ctx
        .control
        .init_workflow(&request)
        .map_err(|_| "workflow daemon unavailable".to_string())?;

    let mut out = format!(
        "\nAuto-chaining to /{} (recommended by the {} phase).\n",
        recommended.name(),
        parent.current_phase
    );
    if let Some(session) = session {
        if let Err(err) =
            ctx.sessions
                .write_pointer(session, &state.workflow_id, Some(recommended.name()))
        {
            ctx.log.error("pointer_write_failed", &err.to_string());
            out.push_str(&format!(
                "\nWarning: workflow {} is not tracked for this session: {err}\n",
                state.workflow_id
            ));
        }
    }
    ctx.log.info(
        "auto_chained",
        &format!(
            "parent={} workflow_id={} command={}",
            parent.workflow_id,
            state.workflow_id,
            recommended.name()
        ),
    );
    out.push_str(&ctx.start_context(&state, session));
    Ok(out)
}

pub fn run_completion(ctx: &HookContext<'_>, raw: &str) -> HookOutcome {
    let Some(event) = parse_event::<SubagentStopEvent>(raw) else {
        return HookOutcome::Allow;
    };
    let Some(agent) = ctx.settings.owned_agent_name(event.agent_kind()) else {
        return HookOutcome::Allow;
    };
    let session = match ctx.session_id(event.session_id.as_deref()) {
        Ok(session) => session,
        Err(err) => {
            ctx.log.warn("invalid_session", &err.to_string());
            return HookOutcome::Allow;
        }
    };
    let Some(state) = ctx.active_state(event.session_id.as_deref()) else {
        return HookOutcome::Allow;
    };

    let recorded = ctx.control.record_agent_event(
        &state.workflow_id,
        EVENT_AGENT_COMPLETED,
        &state.current_phase,
        Some(agent),
    );
    let mut out = completion_context(&state, ctx.settings);
    if !recorded {
        ctx.log.warn(
            "completion_unrecorded",
            &format!("workflow_id={} agent={agent}", state.workflow_id),
        );
        out.push_str(STALE_STATE_WARNING);
    }

    if state.is_dispatcher {
        let recommended = event
            .output_text()
            .and_then(|text| extract_recommended_command(text, ctx.settings));
        if let Some(recommended) = recommended {
            match auto_chain(ctx, &state, recommended, session.as_ref()) {
                Ok(chained) => out.push_str(&chained),
                Err(reason) => {
                    ctx.log.warn(
                        "auto_chain_failed",
                        &format!("command={} reason={reason}", recommended.name()),
                    );
                    out.push_str(&format!(
                        "\nAuto-chain to /{name} failed: {reason}. Run /{name} to continue.\n",
                        name = recommended.name()
                    ));
                }
            }
        }
    }

    HookOutcome::modify(out)
}
