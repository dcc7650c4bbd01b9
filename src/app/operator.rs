use crate::config::HookEnv;
use crate::control::{TransitionRequest, WorkflowControl, WorkflowState};
use crate::session::{parse_session_id, SessionStore};
use serde_json::{Map, Value};

const TRANSITION_USAGE: &str = "usage: transition <to_phase> [--from <phase>] [--evidence <json>] [--condition <c> ...] [--commit <sha>]";

fn tracked_workflow_id(env: &HookEnv) -> Result<Option<String>, String> {
    let raw = env
        .session_id
        .as_deref()
        .ok_or_else(|| "no session id; set CSC_SESSION_ID".to_string())?;
    let session = parse_session_id(raw).map_err(|e| e.to_string())?;
    SessionStore::new(&env.workflows_root)
        .read_pointer(&session)
        .map(|pointer| pointer.map(|p| p.workflow_id))
        .map_err(|e| e.to_string())
}

fn fetch_state(control: &dyn WorkflowControl, workflow_id: &str) -> Result<WorkflowState, String> {
    control
        .get_status(workflow_id)
        .map_err(|e| format!("workflow {workflow_id}: {e}"))
}

fn render_status(state: &WorkflowState) -> String {
    let position = state
        .phase_position()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "?".to_string());
    format!(
        "workflow_id={}\ncommand={}\nworkflow_type={}\ncurrent_phase={}\nphase={position}/{}\nphase_status={}\nrequired_agent={}\nallowed_next_phases={}\nis_dispatcher={}\nphases={}",
        state.workflow_id,
        state.command,
        state.workflow_type,
        state.current_phase,
        state.total_phases(),
        state.phase_status,
        state.required_agent.as_deref().unwrap_or("none"),
        state.allowed_next_phases.join(","),
        state.is_dispatcher,
        state.phase_sequence().join(","),
    )
}

pub fn cmd_status(env: &HookEnv, control: &dyn WorkflowControl) -> Result<String, String> {
    let Some(workflow_id) = tracked_workflow_id(env)? else {
        return Ok("workflow=none".to_string());
    };
    let state = fetch_state(control, &workflow_id)?;
    Ok(render_status(&state))
}

#[derive(Debug, Clone, Default, PartialEq)]
struct TransitionArgs {
    to_phase: String,
    from_phase: Option<String>,
    evidence: Map<String, Value>,
    conditions: Vec<String>,
    commit_sha: Option<String>,
}

fn option_value<'a>(args: &'a [String], i: usize) -> Result<&'a str, String> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| format!("missing value for {}", args[i]))
}

fn parse_transition_args(args: &[String]) -> Result<TransitionArgs, String> {
    let Some(to_phase) = args.first().filter(|a| !a.starts_with("--")) else {
        return Err(TRANSITION_USAGE.to_string());
    };
    let mut parsed = TransitionArgs {
        to_phase: to_phase.clone(),
        ..TransitionArgs::default()
    };
    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--from" => parsed.from_phase = Some(option_value(args, i)?.to_string()),
            "--evidence" => {
                let raw = option_value(args, i)?;
                let value: Value = serde_json::from_str(raw)
                    .map_err(|e| format!("--evidence must be a JSON object: {e}"))?;
                let Value::Object(evidence) = value else {
                    return Err("--evidence must be a JSON object".to_string());
                };
                parsed.evidence = evidence;
            }
            "--condition" => parsed.conditions.push(option_value(args, i)?.to_string()),
            "--commit" => parsed.commit_sha = Some(option_value(args, i)?.to_string()),
            other => return Err(format!("unknown option `{other}`")),
        }
        i += 2;
    }
    Ok(parsed)
}

pub fn cmd_transition(
    args: &[String],
    env: &HookEnv,
    control: &dyn WorkflowControl,
) -> Result<String, String> {
    let parsed = parse_transition_args(args)?;
    let workflow_id = tracked_workflow_id(env)?
        .ok_or_else(|| "no active workflow for this session".to_string())?;
    let from_phase = match parsed.from_phase {
        Some(from) => from,
        None => fetch_state(control, &workflow_id)?.current_phase,
    };

    let result = control.transition(&TransitionRequest {
        workflow_id: workflow_id.clone(),
        session_id: env.session_id.clone(),
        from_phase: from_phase.clone(),
        to_phase: parsed.to_phase.clone(),
        evidence: parsed.evidence,
        conditions_met: parsed.conditions,
        commit_sha: parsed.commit_sha,
    });
    if !result.success {
        let mut lines = vec![format!(
            "transition {from_phase} -> {} rejected: {}",
            parsed.to_phase, result.message
        )];
        lines.extend(
            result
                .missing_conditions
                .iter()
                .map(|c| format!("missing_condition={c}")),
        );
        return Err(lines.join("\n"));
    }
    Ok(format!(
        "transition ok\nworkflow_id={workflow_id}\nnew_phase={}\nnew_status={}\nmessage={}",
        result.new_phase.as_deref().unwrap_or(&parsed.to_phase),
        result.new_status.as_deref().unwrap_or("unknown"),
        result.message
    ))
}
