use crate::shared::serde_ext::{null_as_default, parse_via_optional_string};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseStatus {
    AgentRequired,
    AgentRunning,
    AgentComplete,
    Unknown(String),
}

impl PhaseStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "agent_required" => Self::AgentRequired,
            "agent_running" => Self::AgentRunning,
            "agent_complete" => Self::AgentComplete,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AgentRequired => "agent_required",
            Self::AgentRunning => "agent_running",
            Self::AgentComplete => "agent_complete",
            Self::Unknown(raw) => raw,
        }
    }
}

impl Default for PhaseStatus {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PhaseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PhaseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        parse_via_optional_string(deserializer, Self::parse)
    }
}

/// Daemon-reported workflow snapshot. Never mutated locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub workflow_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub command: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub workflow_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phases: Vec<String>,
    #[serde(default)]
    pub final_phase: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_phase: String,
    #[serde(default)]
    pub phase_status: PhaseStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub allowed_next_phases: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_dispatcher: bool,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub required_agent: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: Map<String, Value>,
}

impl WorkflowState {
    /// Final phase when it extends `phases` rather than repeating an entry.
    fn distinct_final_phase(&self) -> Option<&str> {
        self.final_phase
            .as_deref()
            .filter(|f| !f.is_empty() && !self.phases.iter().any(|p| p == f))
    }

    pub fn total_phases(&self) -> usize {
        self.phases.len() + usize::from(self.distinct_final_phase().is_some())
    }

    /// 1-based display position of `current_phase`.
    pub fn phase_position(&self) -> Option<usize> {
        if let Some(idx) = self.phases.iter().position(|p| p == &self.current_phase) {
            return Some(idx + 1);
        }
        if self.distinct_final_phase() == Some(self.current_phase.as_str()) {
            return Some(self.phases.len() + 1);
        }
        None
    }

    pub fn phase_sequence(&self) -> Vec<&str> {
        let mut sequence: Vec<&str> = self.phases.iter().map(String::as_str).collect();
        if let Some(final_phase) = self.distinct_final_phase() {
            sequence.push(final_phase);
        }
        sequence
    }

    pub fn allows_transition_to(&self, phase: &str) -> bool {
        self.allowed_next_phases.iter().any(|p| p == phase)
    }

    /// Original task text, if the daemon kept one.
    pub fn task_text(&self) -> Option<&str> {
        self.task
            .as_deref()
            .or(self.prompt.as_deref())
            .or_else(|| self.metadata.get("original_prompt").and_then(Value::as_str))
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub new_phase: Option<String>,
    #[serde(default)]
    pub new_status: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_conditions: Vec<String>,
}

impl TransitionResult {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

fn default_can_stop() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanStopResult {
    #[serde(default = "default_can_stop")]
    pub can_stop: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
}

impl CanStopResult {
    pub fn allowed(reason: impl Into<String>) -> Self {
        Self {
            can_stop: true,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitRequest {
    pub command: String,
    pub session_id: Option<String>,
    pub workspace_root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionRequest {
    pub workflow_id: String,
    pub session_id: Option<String>,
    pub from_phase: String,
    pub to_phase: String,
    pub evidence: Map<String, Value>,
    pub conditions_met: Vec<String>,
    pub commit_sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRequest {
    pub workflow_id: String,
    pub event_type: String,
    pub phase: String,
    pub agent: Option<String>,
    pub data: Map<String, Value>,
}

pub const EVENT_AGENT_STARTED: &str = "agent_started";
pub const EVENT_AGENT_COMPLETED: &str = "agent_completed";
