pub mod cli;
pub mod hook_runner;
pub mod operator;

use crate::config::HookEnv;
use crate::control::ControlClient;
use crate::hooks::HookOutcome;
use crate::shared::logging::HookLog;
use cli::{help_text, parse_cli_verb, CliVerb};
use hook_runner::{run_hook, HookKind};
use std::io::Read;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// What the binary prints and how it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutput {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub exit_code: i32,
}

impl CliOutput {
    fn from_hook(outcome: &HookOutcome) -> Self {
        Self {
            stdout: outcome.decision_json(),
            stderr: None,
            exit_code: outcome.exit_code(),
        }
    }

    fn from_command(result: Result<String, String>) -> Self {
        match result {
            Ok(out) => Self {
                stdout: Some(out),
                stderr: None,
                exit_code: 0,
            },
            Err(err) => Self {
                stdout: None,
                stderr: Some(err),
                exit_code: 1,
            },
        }
    }
}

fn read_event(mut stdin: impl Read) -> String {
    let mut raw = String::new();
    if stdin.read_to_string(&mut raw).is_err() {
        raw.clear();
    }
    raw
}

/// A panicking interceptor still acknowledges its event.
fn run_hook_guarded(kind: HookKind, raw: &str) -> HookOutcome {
    catch_unwind(AssertUnwindSafe(|| run_hook(kind, raw, HookEnv::from_process())))
        .unwrap_or(HookOutcome::Allow)
}

fn run_operator(verb: CliVerb, args: &[String]) -> Result<String, String> {
    let env = HookEnv::from_process().map_err(|e| e.to_string())?;
    let client = ControlClient::new(
        &env.engine_url,
        HookLog::new("operator", Some(env.log_path.clone())),
    );
    match verb {
        CliVerb::Status => operator::cmd_status(&env, &client),
        CliVerb::Transition => operator::cmd_transition(args, &env, &client),
        _ => Err(help_text()),
    }
}

pub fn run_cli(args: &[String], stdin: impl Read) -> CliOutput {
    let Some(verb_arg) = args.first() else {
        return CliOutput::from_command(Ok(help_text()));
    };
    let verb = parse_cli_verb(verb_arg);
    let kind = match verb {
        CliVerb::PromptSubmit => HookKind::PromptSubmit,
        CliVerb::PreToolUse => HookKind::PreToolUse,
        CliVerb::SubagentStop => HookKind::SubagentStop,
        CliVerb::Stop => HookKind::Stop,
        CliVerb::Status | CliVerb::Transition => {
            return CliOutput::from_command(run_operator(verb, &args[1..]));
        }
        CliVerb::Help => return CliOutput::from_command(Ok(help_text())),
        CliVerb::Unknown => {
            return CliOutput::from_command(Err(format!(
                "unknown command `{verb_arg}`\n\n{}",
                help_text()
            )))
        }
    };
    let raw = read_event(stdin);
    CliOutput::from_hook(&run_hook_guarded(kind, &raw))
}
