pub mod env;
pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use env::HookEnv;
pub use error::ConfigError;
pub use load::load_hook_settings;
pub use settings::{CommandSpec, Settings, SettingsFile};
