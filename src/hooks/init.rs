use super::protocol::{parse_event, HookOutcome, PromptSubmitEvent};
use super::workspace::resolve_workspace_root;
use super::HookContext;
use crate::config::{CommandSpec, Settings};
use crate::control::InitRequest;
use serde_json::{Map, Value};

pub const INIT_SOURCE: &str = "workflow_hook";

/// Recognized `/command` at the start of a prompt, plus the task text after it.
///
/// The longest configured name that prefixes the text after `/` wins, and it
/// must end at a word boundary, so `/planning` never matches `plan` while
/// `/plan: x` does. An empty remainder falls back to the whole prompt.
pub fn parse_command<'s>(prompt: &str, settings: &'s Settings) -> Option<(&'s CommandSpec, String)> {
    let trimmed = prompt.trim();
    let rest = trimmed.strip_prefix('/')?;
    let (spec, remainder) = settings
        .commands
        .iter()
        .filter_map(|spec| {
            let name = spec.name();
            let head = rest.get(..name.len())?;
            if name.is_empty() || !head.eq_ignore_ascii_case(name) {
                return None;
            }
            let remainder = &rest[name.len()..];
            let boundary = remainder
                .chars()
                .next()
                .map_or(true, |ch| !(ch.is_ascii_alphanumeric() || ch == '_'));
            boundary.then_some((spec, remainder))
        })
        .max_by_key(|(spec, _)| spec.name().len())?;
    let task = match remainder.trim() {
        "" => trimmed.to_string(),
        task => task.to_string(),
    };
    Some((spec, task))
}

pub fn run_init(ctx: &HookContext<'_>, raw: &str) -> HookOutcome {
    let Some(event) = parse_event::<PromptSubmitEvent>(raw) else {
        return HookOutcome::Allow;
    };
    let Some((spec, task)) = parse_command(&event.prompt, ctx.settings) else {
        return HookOutcome::Allow;
    };

    let session = match ctx.session_id(event.session_id.as_deref()) {
        Ok(session) => session,
        Err(err) => {
            ctx.log.error("invalid_session", &err.to_string());
            return HookOutcome::block(format!("Cannot start /{}: {err}", spec.name()));
        }
    };
    let workspace_root = match resolve_workspace_root(
        ctx.env.workspace_root_override.as_deref(),
        &ctx.env.cwd,
    ) {
        Ok(root) => root,
        Err(err) => {
            ctx.log.error("invalid_workspace_root", &err.to_string());
            return HookOutcome::block(format!("Cannot start /{}: {err}", spec.name()));
        }
    };

    let mut metadata = Map::new();
    metadata.insert("source".to_string(), Value::from(INIT_SOURCE));
    metadata.insert(
        "original_prompt".to_string(),
        Value::from(event.prompt.trim()),
    );
    let request = InitRequest {
        command: spec.name().to_string(),
        session_id: session.as_ref().map(|s| s.as_str().to_string()),
        workspace_root: workspace_root.display().to_string(),
        task: Some(task),
        metadata,
    };

    let state = match ctx.control.init_workflow(&request) {
        Ok(state) => state,
        Err(err) => {
            ctx.log.warn(
                "init_skipped",
                &format!("workflow tracking disabled for /{}: {err}", spec.name()),
            );
            return HookOutcome::Allow;
        }
    };

    match &session {
        Some(session) => {
            if let Err(err) = ctx
                .sessions
                .write_pointer(session, &state.workflow_id, Some(spec.name()))
            {
                ctx.log.error("pointer_write_failed", &err.to_string());
                return HookOutcome::block(format!(
                    "Workflow {} was created but could not be tracked for this session: {err}",
                    state.workflow_id
                ));
            }
        }
        None => ctx.log.warn(
            "untracked_workflow",
            &format!(
                "no session id; workflow {} will not be gated",
                state.workflow_id
            ),
        ),
    }
    ctx.log.info(
        "workflow_initialized",
        &format!(
            "workflow_id={} command={} phase={}",
            state.workflow_id, state.command, state.current_phase
        ),
    );

    HookOutcome::modify(ctx.start_context(&state, session.as_ref()))
}
