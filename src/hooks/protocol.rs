use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const EXIT_ALLOW: i32 = 0;
pub const EXIT_BLOCK: i32 = 2;

/// What an interceptor tells the host once it is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    Allow,
    Modify { append: String },
    Block { reason: String },
}

#[derive(Debug, Serialize)]
struct ModifyDecision<'a> {
    decision: &'static str,
    modifications: Modifications<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Modifications<'a> {
    append_to_prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct BlockDecision<'a> {
    decision: &'static str,
    reason: &'a str,
}

impl HookOutcome {
    pub fn block(reason: impl Into<String>) -> Self {
        Self::Block {
            reason: reason.into(),
        }
    }

    pub fn modify(append: impl Into<String>) -> Self {
        Self::Modify {
            append: append.into(),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Block { .. } => EXIT_BLOCK,
            Self::Allow | Self::Modify { .. } => EXIT_ALLOW,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, Self::Block { .. })
    }

    /// The single JSON object written to stdout, if any.
    pub fn decision_json(&self) -> Option<String> {
        let encoded = match self {
            Self::Allow => return None,
            Self::Modify { append } => serde_json::to_string(&ModifyDecision {
                decision: "modify",
                modifications: Modifications {
                    append_to_prompt: append,
                },
            }),
            Self::Block { reason } => serde_json::to_string(&BlockDecision {
                decision: "block",
                reason,
            }),
        };
        encoded.ok()
    }
}

/// Blank or malformed payloads mean there is nothing to do.
pub fn parse_event<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PromptSubmitEvent {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PreToolUseEvent {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AgentInvocationInput {
    #[serde(default)]
    pub subagent_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransitionInput {
    #[serde(default)]
    pub from_phase: Option<String>,
    #[serde(default)]
    pub to_phase: Option<String>,
}

impl PreToolUseEvent {
    /// Typed view of `tool_input`; shapes that do not fit read as defaults.
    pub fn input<T: DeserializeOwned + Default>(&self) -> T {
        serde_json::from_value(self.tool_input.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SubagentStopEvent {
    #[serde(default)]
    pub subagent_type: String,
    #[serde(default)]
    pub agent_type: Option<String>,
    #[serde(default)]
    pub agent_output: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub last_assistant_message: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl SubagentStopEvent {
    pub fn agent_kind(&self) -> &str {
        if !self.subagent_type.trim().is_empty() {
            return self.subagent_type.trim();
        }
        self.agent_type.as_deref().map(str::trim).unwrap_or_default()
    }

    pub fn output_text(&self) -> Option<&str> {
        [&self.agent_output, &self.output, &self.last_assistant_message]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .find(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StopEvent {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_json_shapes() {
        assert_eq!(HookOutcome::Allow.decision_json(), None);
        assert_eq!(HookOutcome::Allow.exit_code(), 0);

        let modify = HookOutcome::modify("ctx");
        let value: Value =
            serde_json::from_str(&modify.decision_json().expect("json")).expect("parse");
        assert_eq!(value["decision"], "modify");
        assert_eq!(value["modifications"]["appendToPrompt"], "ctx");
        assert_eq!(modify.exit_code(), 0);

        let block = HookOutcome::block("nope");
        let value: Value =
            serde_json::from_str(&block.decision_json().expect("json")).expect("parse");
        assert_eq!(value["decision"], "block");
        assert_eq!(value["reason"], "nope");
        assert_eq!(block.exit_code(), 2);
    }

    #[test]
    fn malformed_payloads_parse_to_none() {
        assert_eq!(parse_event::<PromptSubmitEvent>(""), None);
        assert_eq!(parse_event::<PromptSubmitEvent>("{oops"), None);
        assert_eq!(parse_event::<PromptSubmitEvent>("[1,2]"), None);
        let event: PromptSubmitEvent = parse_event(r#"{"prompt":"/plan x","cwd":"/r"}"#).expect("event");
        assert_eq!(event.prompt, "/plan x");
    }

    #[test]
    fn tool_input_views_default_on_shape_mismatch() {
        let event: PreToolUseEvent = parse_event(
            r#"{"tool_name":"mcp__workflow__workflow_transition","tool_input":{"to_phase":"validate"}}"#,
        )
        .expect("event");
        let transition: TransitionInput = event.input();
        assert_eq!(transition.to_phase.as_deref(), Some("validate"));
        assert_eq!(transition.from_phase, None);

        let event: PreToolUseEvent =
            parse_event(r#"{"tool_name":"Task","tool_input":"free text"}"#).expect("event");
        let agent: AgentInvocationInput = event.input();
        assert_eq!(agent.subagent_type, "");
    }

    #[test]
    fn subagent_output_prefers_first_non_blank_field() {
        let event: SubagentStopEvent = parse_event(
            r#"{"agent_type":"forge3:router-agent","output":"  ","last_assistant_message":"Recommended: /verify"}"#,
        )
        .expect("event");
        assert_eq!(event.agent_kind(), "forge3:router-agent");
        assert_eq!(event.output_text(), Some("Recommended: /verify"));
    }
}
