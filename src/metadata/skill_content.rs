use crate::config::paths::skill_file_path;
use std::fs;
use std::path::Path;

const FRONTMATTER_DELIMITER: &str = "---";

/// Reads `<plugin_root>/skills/<skill>/SKILL.md` without its frontmatter.
///
/// Missing or unreadable files yield `None`; callers treat that as nothing to
/// inject.
pub fn load_skill_content(plugin_root: &Path, skill: &str) -> Option<String> {
    let skill = skill.trim();
    if skill.is_empty() || skill.contains(['/', '\\']) || skill == ".." {
        return None;
    }
    let raw = fs::read_to_string(skill_file_path(plugin_root, skill)).ok()?;
    let body = strip_frontmatter(&raw);
    if body.is_empty() {
        None
    } else {
        Some(body)
    }
}

/// Removes a leading `---` delimited metadata block.
///
/// Content without a closing delimiter is returned unchanged apart from
/// surrounding whitespace.
pub fn strip_frontmatter(content: &str) -> String {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return String::new();
    };
    if first.trim_end() != FRONTMATTER_DELIMITER {
        return content.trim().to_string();
    }

    let mut consumed = first.len();
    for line in lines {
        consumed += line.len();
        if line.trim_end() == FRONTMATTER_DELIMITER {
            return content[consumed..].trim().to_string();
        }
    }
    content.trim().to_string()
}

pub fn format_skill_tag(phase: &str, content: &str, command: Option<&str>) -> String {
    match command {
        Some(command) => format!(
            "<phase-skill-reference phase=\"{phase}\" command=\"{command}\">\n{content}\n</phase-skill-reference>"
        ),
        None => format!(
            "<phase-skill-reference phase=\"{phase}\">\n{content}\n</phase-skill-reference>"
        ),
    }
}

pub fn phase_skill_injection(
    plugin_root: &Path,
    skill: &str,
    phase: &str,
    command: Option<&str>,
) -> Option<String> {
    let content = load_skill_content(plugin_root, skill)?;
    Some(format_skill_tag(phase, &content, command))
}
