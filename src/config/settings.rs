use super::ConfigError;
use crate::metadata::{default_agent_table, default_skill_table, normalize_command, LayeredTable};
use crate::shared::ids::CommandName;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_AGENT_NAMESPACE: &str = "forge3";
pub const DEFAULT_AGENT_TOOL: &str = "Task";
pub const DEFAULT_TRANSITION_TOOL: &str = "mcp__workflow__workflow_transition";
pub const DEFAULT_LEGACY_TRANSITION_TOOL: &str = "workflow_transition";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub name: CommandName,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dispatcher: bool,
}

const BUILTIN_COMMANDS: &[(&str, &str, bool)] = &[
    ("assist", "Classify the task and route it", true),
    ("plan", "For component structure planning", false),
    ("create", "For file creation", false),
    ("verify", "For validation", false),
    ("health-check", "For repository health analysis", false),
];

impl CommandSpec {
    fn builtin((name, description, dispatcher): &(&str, &str, bool)) -> Option<Self> {
        Some(Self {
            name: CommandName::parse(name).ok()?,
            description: description.to_string(),
            dispatcher: *dispatcher,
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// Effective hook settings: built-in defaults with `hooks.yaml` applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub agent_namespace: String,
    pub agent_tool: String,
    pub transition_tool: String,
    pub legacy_transition_tool: String,
    pub commands: Vec<CommandSpec>,
    pub skills: LayeredTable,
    pub agents: LayeredTable,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            agent_namespace: DEFAULT_AGENT_NAMESPACE.to_string(),
            agent_tool: DEFAULT_AGENT_TOOL.to_string(),
            transition_tool: DEFAULT_TRANSITION_TOOL.to_string(),
            legacy_transition_tool: DEFAULT_LEGACY_TRANSITION_TOOL.to_string(),
            commands: BUILTIN_COMMANDS
                .iter()
                .filter_map(CommandSpec::builtin)
                .collect(),
            skills: default_skill_table(),
            agents: default_agent_table(),
        }
    }
}

/// On-disk shape of `hooks.yaml`; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    pub agent_namespace: Option<String>,
    pub agent_tool: Option<String>,
    pub transition_tool: Option<String>,
    pub legacy_transition_tool: Option<String>,
    pub commands: Option<Vec<CommandSpec>>,
    pub skills: LayeredTable,
    pub agents: LayeredTable,
}

impl SettingsFile {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

impl Settings {
    pub fn with_overlay(mut self, file: SettingsFile) -> Self {
        if let Some(namespace) = file.agent_namespace {
            self.agent_namespace = namespace;
        }
        if let Some(tool) = file.agent_tool {
            self.agent_tool = tool;
        }
        if let Some(tool) = file.transition_tool {
            self.transition_tool = tool;
        }
        if let Some(tool) = file.legacy_transition_tool {
            self.legacy_transition_tool = tool;
        }
        if let Some(commands) = file.commands {
            self.commands = commands;
        }
        self.skills = self.skills.merged_with(&file.skills);
        self.agents = self.agents.merged_with(&file.agents);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commands.is_empty() {
            return Err(ConfigError::Settings(
                "`commands` must list at least one command".to_string(),
            ));
        }
        let mut seen = std::collections::BTreeSet::new();
        for command in &self.commands {
            if !seen.insert(command.name().to_ascii_lowercase()) {
                return Err(ConfigError::Settings(format!(
                    "command `{}` is listed more than once",
                    command.name()
                )));
            }
        }
        if self.commands.iter().filter(|c| c.dispatcher).count() > 1 {
            return Err(ConfigError::Settings(
                "at most one command may be marked `dispatcher`".to_string(),
            ));
        }
        for (field, value) in [
            ("agent_namespace", &self.agent_namespace),
            ("agent_tool", &self.agent_tool),
            ("transition_tool", &self.transition_tool),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Settings(format!("`{field}` must be non-empty")));
            }
        }
        Ok(())
    }

    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        let name = normalize_command(name);
        self.commands
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub fn is_dispatcher_command(&self, name: &str) -> bool {
        self.command(name).is_some_and(|c| c.dispatcher)
    }

    /// Commands a dispatcher may route to.
    pub fn routable_commands(&self) -> impl Iterator<Item = &CommandSpec> {
        self.commands.iter().filter(|c| !c.dispatcher)
    }

    pub fn agent_prefix(&self) -> String {
        format!("{}:", self.agent_namespace)
    }

    pub fn namespaced_agent(&self, agent: &str) -> String {
        if agent.starts_with(&self.agent_prefix()) {
            agent.to_string()
        } else {
            format!("{}{agent}", self.agent_prefix())
        }
    }

    /// Bare agent name when `subagent_type` belongs to this workflow system.
    pub fn owned_agent_name<'a>(&self, subagent_type: &'a str) -> Option<&'a str> {
        subagent_type
            .strip_prefix(&self.agent_prefix())
            .filter(|name| !name.is_empty())
    }
}
