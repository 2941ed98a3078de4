//! Hook configuration and storage-root resolution.

use std::path::{Path, PathBuf};

/// Directory created under the resolved base for all task reports.
const REPORTS_DIR_NAME: &str = ".task-reports";

/// Environment override for the reports base directory.
pub const REPORTS_BASE_ENV: &str = "TASK_REPORTS_BASE";

/// Environment override for the expected worker role-family prefix.
pub const ROLE_PREFIX_ENV: &str = "WORKFLOW_HOOKS_ROLE_PREFIX";

/// Hook configuration.
#[derive(Debug, Clone)]
pub struct HookConfig {
    /// Role-family prefix; workers outside this family are ignored.
    pub role_prefix: String,
    /// Declared action name that marks a "spawn worker" log entry.
    pub spawn_tool: String,
    /// Producer tag recorded on auto-saved signals.
    pub saved_by: String,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            role_prefix: "backend-toolbox:".to_string(),
            spawn_tool: "Task".to_string(),
            saved_by: "SubagentStop hook".to_string(),
        }
    }
}

impl HookConfig {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(prefix) = std::env::var(ROLE_PREFIX_ENV) {
            if !prefix.is_empty() {
                config.role_prefix = prefix;
            }
        }
        config
    }

    /// Whether a declared role belongs to the expected family.
    pub fn role_matches(&self, role: &str) -> bool {
        role.starts_with(&self.role_prefix)
    }
}

/// Resolve the base directory for task reports.
///
/// The env override wins; otherwise the nearest enclosing git root (or the
/// current directory when none is found) gets a `.task-reports` subdirectory.
pub fn resolve_reports_base() -> PathBuf {
    if let Ok(base) = std::env::var(REPORTS_BASE_ENV) {
        if !base.is_empty() {
            return PathBuf::from(base);
        }
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_git_root(&cwd).unwrap_or(cwd).join(REPORTS_DIR_NAME)
}

/// Walk up from `start` looking for a directory containing `.git`.
fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}
