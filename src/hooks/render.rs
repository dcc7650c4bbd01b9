use crate::config::Settings;
use crate::control::WorkflowState;

const SEQUENCE_ARROW: &str = " → ";

pub fn capitalize_phase(phase: &str) -> String {
    let mut chars = phase.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `[Phase i/N: Name]`, with `?` when the phase is not in the sequence.
pub fn phase_label(state: &WorkflowState) -> String {
    let position = state
        .phase_position()
        .map(|p| p.to_string())
        .unwrap_or_else(|| "?".to_string());
    format!(
        "[Phase {position}/{}: {}]",
        state.total_phases(),
        capitalize_phase(&state.current_phase)
    )
}

pub fn start_banner(state: &WorkflowState) -> String {
    format!("{} Starting...", phase_label(state))
}

pub fn complete_banner(state: &WorkflowState) -> String {
    format!("{} Agent complete", phase_label(state))
}

pub fn phase_sequence_line(state: &WorkflowState) -> String {
    state.phase_sequence().join(SEQUENCE_ARROW)
}

fn display_command(command: &str) -> String {
    format!("/{}", command.trim().trim_start_matches('/'))
}

fn routable_command_list(settings: &Settings) -> String {
    settings
        .routable_commands()
        .map(|c| display_command(c.name()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn action_message(state: &WorkflowState, settings: &Settings, required_agent: Option<&str>) -> String {
    let Some(agent) = required_agent else {
        return format!(
            "No agent is registered for phase {}; follow the phase guidance below.",
            state.current_phase
        );
    };
    let invocation = format!(
        "Required action: Invoke {agent} agent using {tool} tool (subagent_type \"{namespaced}\").",
        tool = settings.agent_tool,
        namespaced = settings.namespaced_agent(agent),
    );
    if state.is_dispatcher {
        format!(
            "{invocation}\n\nIMPORTANT: You MUST invoke the {agent} agent first.\n\
             After it completes, recommend which command to run ({}).",
            routable_command_list(settings)
        )
    } else {
        format!(
            "{invocation}\n\nIMPORTANT: You MUST invoke the {agent} agent before any other tools."
        )
    }
}

/// Context appended when a workflow starts: banner, identity, required agent,
/// phase sequence and the current phase's skill reference.
pub fn start_context(
    state: &WorkflowState,
    settings: &Settings,
    session_id: Option<&str>,
    required_agent: Option<&str>,
    skill_injection: Option<&str>,
) -> String {
    let mut out = format!(
        "\n\n---\n{banner}\n---\n\n<workflow-context>\n\
         Workflow initialized: {id}\n\
         Command: {command}\n\
         Workflow type: {workflow_type}\n\
         Session: {session}\n\
         Current phase: {phase}\n\
         Required agent: {agent}\n\
         Phases: {sequence}\n\n\
         {action}\n\
         </workflow-context>\n",
        banner = start_banner(state),
        id = state.workflow_id,
        command = display_command(&state.command),
        workflow_type = state.workflow_type,
        session = state
            .session_id
            .as_deref()
            .or(session_id)
            .unwrap_or("default"),
        phase = state.current_phase,
        agent = required_agent.unwrap_or("none"),
        sequence = phase_sequence_line(state),
        action = action_message(state, settings, required_agent),
    );
    if let Some(skill) = skill_injection {
        out.push('\n');
        out.push_str(skill);
        out.push('\n');
    }
    out
}

fn transition_template(state: &WorkflowState, settings: &Settings) -> String {
    let target = state
        .allowed_next_phases
        .first()
        .map(String::as_str)
        .unwrap_or("next_phase");
    format!(
        "To proceed to the next phase, use the {tool} tool:\n```\n{tool}(\n  from_phase=\"{from}\",\n  to_phase=\"{target}\",\n  evidence={{...}},\n  conditions_met=[...]\n)\n```\n",
        tool = settings.transition_tool,
        from = state.current_phase,
    )
}

pub fn next_steps(state: &WorkflowState, settings: &Settings) -> String {
    if state.is_dispatcher {
        let mut out = String::from(
            "\nDispatcher phase complete. Based on the router's classification, \
             recommend one of these commands to the user:\n",
        );
        for command in settings.routable_commands() {
            if command.description.trim().is_empty() {
                out.push_str(&format!("- {}\n", display_command(command.name())));
            } else {
                out.push_str(&format!(
                    "- {} - {}\n",
                    display_command(command.name()),
                    command.description.trim()
                ));
            }
        }
        return out;
    }
    if state.allowed_next_phases.is_empty() {
        return "\nWorkflow complete. All phases finished.\n".to_string();
    }
    format!(
        "\nAllowed next phases: {}\n\n{}",
        state.allowed_next_phases.join(", "),
        transition_template(state, settings)
    )
}

pub fn completion_context(state: &WorkflowState, settings: &Settings) -> String {
    format!(
        "\n---\n{}\n---\n{}",
        complete_banner(state),
        next_steps(state, settings)
    )
}
