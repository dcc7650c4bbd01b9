use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Phase-generic entries with per-command fallbacks.
///
/// The generic table wins; a command-specific entry is consulted only when
/// the phase has no generic entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredTable {
    pub generic: BTreeMap<String, String>,
    pub by_command: BTreeMap<String, BTreeMap<String, String>>,
}

impl LayeredTable {
    pub fn lookup(&self, phase: &str, command: Option<&str>) -> Option<&str> {
        if let Some(value) = self.generic.get(phase).filter(|v| !v.is_empty()) {
            return Some(value.as_str());
        }
        let command = normalize_command(command?);
        self.by_command
            .get(command)
            .and_then(|phases| phases.get(phase))
            .filter(|v| !v.is_empty())
            .map(String::as_str)
    }

    /// Entries from `overlay` replace entries with the same key.
    pub fn merged_with(&self, overlay: &LayeredTable) -> LayeredTable {
        let mut merged = self.clone();
        for (phase, value) in &overlay.generic {
            merged.generic.insert(phase.clone(), value.clone());
        }
        for (command, phases) in &overlay.by_command {
            let entry = merged
                .by_command
                .entry(normalize_command(command).to_string())
                .or_default();
            for (phase, value) in phases {
                entry.insert(phase.clone(), value.clone());
            }
        }
        merged
    }
}

/// Daemons may report namespaced commands (`assist:verify`); tables are keyed
/// by the bare command name.
pub fn normalize_command(command: &str) -> &str {
    let trimmed = command.trim().trim_start_matches('/');
    trimmed.rsplit(':').next().unwrap_or(trimmed)
}

type PhaseEntries = &'static [(&'static str, &'static str)];

const GENERIC_PHASE_SKILLS: PhaseEntries = &[
    ("router", "router-skill"),
    ("semantic", "semantic-skill"),
    ("execute", "execute-skill"),
    ("schema-check", "schema-check-skill"),
];

const COMMAND_PHASE_SKILLS: &[(&str, PhaseEntries)] = &[
    (
        "verify",
        &[
            ("discover", "verify-discover-skill"),
            ("validate", "verify-validate-skill"),
            ("connectivity", "verify-connectivity-skill"),
        ],
    ),
    (
        "health-check",
        &[
            ("discover", "health-discover-skill"),
            ("analyze", "health-analyze-skill"),
            ("aggregate", "health-aggregate-skill"),
        ],
    ),
];

const GENERIC_PHASE_AGENTS: PhaseEntries = &[
    ("router", "router-agent"),
    ("semantic", "semantic-agent"),
    ("execute", "execute-agent"),
    ("schema-check", "schema-check-agent"),
];

const COMMAND_PHASE_AGENTS: &[(&str, PhaseEntries)] = &[
    (
        "verify",
        &[
            ("discover", "verify-discovery-agent"),
            ("validate", "verify-validate-agent"),
            ("connectivity", "verify-connectivity-agent"),
        ],
    ),
    (
        "health-check",
        &[
            ("discover", "health-discovery-agent"),
            ("analyze", "health-analyze-agent"),
            ("aggregate", "health-aggregate-agent"),
        ],
    ),
];

fn entries_to_map(entries: PhaseEntries) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn table(generic: PhaseEntries, by_command: &[(&str, PhaseEntries)]) -> LayeredTable {
    LayeredTable {
        generic: entries_to_map(generic),
        by_command: by_command
            .iter()
            .map(|(command, phases)| (command.to_string(), entries_to_map(phases)))
            .collect(),
    }
}

pub fn default_skill_table() -> LayeredTable {
    table(GENERIC_PHASE_SKILLS, COMMAND_PHASE_SKILLS)
}

pub fn default_agent_table() -> LayeredTable {
    table(GENERIC_PHASE_AGENTS, COMMAND_PHASE_AGENTS)
}
