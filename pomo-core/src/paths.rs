//! Where pomo keeps its files

use directories::ProjectDirs;
use std::path::PathBuf;

pub const SESSION_LOG_FILE: &str = "sessions.jsonl";
pub const CONFIG_FILE: &str = "pomo.toml";
pub const TRACE_LOG_FILE: &str = "pomo.log";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "pomo", "pomo")
}

/// Default location of the session log.
pub fn session_log() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join(SESSION_LOG_FILE))
}

pub fn config_file() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Diagnostic log of the terminal app.
pub fn trace_log() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().join(TRACE_LOG_FILE))
}
