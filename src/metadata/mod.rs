pub mod injection;
pub mod skill_content;

pub use injection::{default_agent_table, default_skill_table, normalize_command, LayeredTable};
pub use skill_content::{format_skill_tag, load_skill_content, phase_skill_injection, strip_frontmatter};

use crate::config::Settings;
use std::path::Path;

/// Read-only lookup from (phase, command) to injected reference material and
/// required-agent identity.
#[derive(Debug, Clone, Copy)]
pub struct MetadataResolver<'a> {
    settings: &'a Settings,
    plugin_root: Option<&'a Path>,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(settings: &'a Settings, plugin_root: Option<&'a Path>) -> Self {
        Self {
            settings,
            plugin_root,
        }
    }

    pub fn resolve_skill(&self, phase: &str, command: Option<&str>) -> Option<&'a str> {
        self.settings.skills.lookup(phase, command)
    }

    pub fn resolve_agent(&self, phase: &str, command: Option<&str>) -> Option<&'a str> {
        self.settings.agents.lookup(phase, command)
    }

    pub fn load_skill_content(&self, skill: &str) -> Option<String> {
        load_skill_content(self.plugin_root?, skill)
    }

    /// Skill content for `phase`, wrapped for injection into the agent context.
    pub fn skill_injection(&self, phase: &str, command: Option<&str>) -> Option<String> {
        let skill = self.resolve_skill(phase, command)?;
        phase_skill_injection(self.plugin_root?, skill, phase, command)
    }
}
