use super::paths::settings_file_path;
use super::settings::{Settings, SettingsFile};
use super::ConfigError;
use std::path::Path;

/// Loads `<plugin_root>/hooks.yaml` over the built-in defaults.
///
/// A missing plugin root or settings file yields the defaults.
pub fn load_hook_settings(plugin_root: Option<&Path>) -> Result<Settings, ConfigError> {
    let Some(plugin_root) = plugin_root else {
        return Ok(Settings::default());
    };
    let path = settings_file_path(plugin_root);
    if !path.is_file() {
        return Ok(Settings::default());
    }
    let settings = Settings::default().with_overlay(SettingsFile::from_path(&path)?);
    settings.validate()?;
    Ok(settings)
}
