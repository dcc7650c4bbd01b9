use crate::config::{load_hook_settings, ConfigError, HookEnv, Settings};
use crate::control::{ControlClient, WorkflowControl};
use crate::hooks::protocol::{parse_event, PromptSubmitEvent};
use crate::hooks::{parse_command, run_completion, run_gate, run_init, run_stop, HookContext, HookOutcome};
use crate::shared::logging::HookLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    PromptSubmit,
    PreToolUse,
    SubagentStop,
    Stop,
}

impl HookKind {
    pub fn log_name(self) -> &'static str {
        match self {
            Self::PromptSubmit => "init",
            Self::PreToolUse => "gate",
            Self::SubagentStop => "complete",
            Self::Stop => "stop",
        }
    }
}

/// Hook settings; an unusable `hooks.yaml` degrades to the defaults.
pub fn settings_for(env: &HookEnv, log: &HookLog) -> Settings {
    match load_hook_settings(env.plugin_root.as_deref()) {
        Ok(settings) => settings,
        Err(err) => {
            log.warn("settings_invalid", &format!("{err}; using defaults"));
            Settings::default()
        }
    }
}

pub fn dispatch_hook(kind: HookKind, ctx: &HookContext<'_>, raw: &str) -> HookOutcome {
    match kind {
        HookKind::PromptSubmit => run_init(ctx, raw),
        HookKind::PreToolUse => run_gate(ctx, raw),
        HookKind::SubagentStop => run_completion(ctx, raw),
        HookKind::Stop => run_stop(ctx, raw),
    }
}

/// Without a usable environment only a recognized workflow command is refused;
/// every other event passes through.
fn environment_failure(kind: HookKind, raw: &str, err: &ConfigError) -> HookOutcome {
    HookLog::new(kind.log_name(), None).error("environment_unavailable", &err.to_string());
    if kind != HookKind::PromptSubmit {
        return HookOutcome::Allow;
    }
    let settings = Settings::default();
    let command = parse_event::<PromptSubmitEvent>(raw)
        .and_then(|event| parse_command(&event.prompt, &settings).map(|(spec, _)| spec.name().to_string()));
    match command {
        Some(command) => HookOutcome::block(format!("Cannot start /{command}: {err}")),
        None => HookOutcome::Allow,
    }
}

pub fn run_hook_with(kind: HookKind, raw: &str, env: &HookEnv, control: &dyn WorkflowControl) -> HookOutcome {
    let log = HookLog::new(kind.log_name(), Some(env.log_path.clone()));
    let settings = settings_for(env, &log);
    let ctx = HookContext::new(env, &settings, control, &log);
    dispatch_hook(kind, &ctx, raw)
}

pub fn run_hook(kind: HookKind, raw: &str, env: Result<HookEnv, ConfigError>) -> HookOutcome {
    let env = match env {
        Ok(env) => env,
        Err(err) => return environment_failure(kind, raw, &err),
    };
    let log = HookLog::new(kind.log_name(), Some(env.log_path.clone()));
    let client = ControlClient::new(&env.engine_url, log);
    run_hook_with(kind, raw, &env, &client)
}
