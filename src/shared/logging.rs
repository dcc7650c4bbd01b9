use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// JSON-lines diagnostics for one interceptor invocation.
///
/// Warnings and errors are echoed to stderr; stdout stays reserved for the
/// hook decision object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookLog {
    hook: String,
    path: Option<PathBuf>,
    echo_stderr: bool,
}

impl HookLog {
    pub fn new(hook: &str, path: Option<PathBuf>) -> Self {
        Self {
            hook: hook.to_string(),
            path,
            echo_stderr: true,
        }
    }

    pub fn disabled(hook: &str) -> Self {
        Self {
            hook: hook.to_string(),
            path: None,
            echo_stderr: false,
        }
    }

    pub fn info(&self, event: &str, message: &str) {
        self.append(LogLevel::Info, event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.append(LogLevel::Warn, event, message);
    }

    pub fn error(&self, event: &str, message: &str) {
        self.append(LogLevel::Error, event, message);
    }

    pub fn append(&self, level: LogLevel, event: &str, message: &str) {
        if self.echo_stderr && level != LogLevel::Info {
            eprintln!("phasegate[{}]: {message}", self.hook);
        }
        if let Some(path) = &self.path {
            append_hook_log_line(path, &self.hook, level, event, message);
        }
    }
}

pub fn append_hook_log_line(path: &Path, hook: &str, level: LogLevel, event: &str, message: &str) {
    let payload = serde_json::json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "level": level.as_str(),
        "hook": hook,
        "event": event,
        "message": message,
    });

    let Ok(line) = serde_json::to_string(&payload) else {
        return;
    };

    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = writeln!(file, "{line}");
}
