#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    PromptSubmit,
    PreToolUse,
    SubagentStop,
    Stop,
    Status,
    Transition,
    Help,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "prompt-submit" | "init" => CliVerb::PromptSubmit,
        "pre-tool-use" | "gate" => CliVerb::PreToolUse,
        "subagent-stop" | "complete" => CliVerb::SubagentStop,
        "stop" => CliVerb::Stop,
        "status" => CliVerb::Status,
        "transition" => CliVerb::Transition,
        "help" | "--help" | "-h" => CliVerb::Help,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Hooks (read one JSON event from stdin):".to_string(),
        "  prompt-submit | init                 Start a workflow for a recognized /command"
            .to_string(),
        "  pre-tool-use | gate                  Gate agent invocations and phase transitions"
            .to_string(),
        "  subagent-stop | complete             Record agent completion and auto-chain"
            .to_string(),
        "  stop                                 Block session stop while a workflow is open"
            .to_string(),
        String::new(),
        "Commands:".to_string(),
        "  status                               Show the session's current workflow".to_string(),
        "  transition <to_phase> [--from <phase>] [--evidence <json>] [--condition <c> ...] [--commit <sha>]"
            .to_string(),
        "                                       Request a phase transition from the daemon"
            .to_string(),
    ]
}

pub fn help_text() -> String {
    cli_help_lines().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_verbs_have_short_aliases() {
        assert_eq!(parse_cli_verb("prompt-submit"), CliVerb::PromptSubmit);
        assert_eq!(parse_cli_verb("init"), CliVerb::PromptSubmit);
        assert_eq!(parse_cli_verb("gate"), CliVerb::PreToolUse);
        assert_eq!(parse_cli_verb("complete"), CliVerb::SubagentStop);
        assert_eq!(parse_cli_verb("stop"), CliVerb::Stop);
        assert_eq!(parse_cli_verb("--help"), CliVerb::Help);
        assert_eq!(parse_cli_verb("Stop"), CliVerb::Unknown);
    }

    #[test]
    fn help_lists_every_verb() {
        let help = help_text();
        for verb in ["prompt-submit", "pre-tool-use", "subagent-stop", "stop", "status", "transition"] {
            assert!(help.contains(verb), "missing {verb}");
        }
    }
}
