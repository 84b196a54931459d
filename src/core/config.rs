//! Layered configuration
//!
//! Project config (`.fit/config.yaml`) overrides the user-level config
//! (`~/.config/fit/config.yaml`), which overrides built-in defaults. The
//! author falls back to `FIT_AUTHOR` / `USER` when unset.

use serde::{Deserialize, Serialize};

use crate::core::project::Project;

/// Workflow-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Approver recorded on submit when the caller gives none
    pub default_approver: String,

    /// Seal runs into the archive as soon as they reach DONE (default: true)
    pub auto_archive: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            default_approver: String::new(),
            auto_archive: true,
        }
    }
}

/// Project configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site this project belongs to (e.g. "HQ", "Plant 2")
    pub site: String,

    /// Default actor identity for commands without `--as`
    pub author: String,

    /// Workflow settings
    pub workflow: WorkflowSettings,
}

impl Config {
    /// Load config for a project, merging project over user-level settings
    pub fn load(project: &Project) -> Self {
        let user = Self::user_config_path()
            .and_then(|p| Self::load_file(&p))
            .unwrap_or_default();
        let local = Self::load_file(&project.config_path()).unwrap_or_default();
        Self::merge(user, local)
    }

    fn load_file(path: &std::path::Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str(&content).ok()
    }

    fn user_config_path() -> Option<std::path::PathBuf> {
        directories::ProjectDirs::from("", "", "fit")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn merge(base: Self, over: Self) -> Self {
        Self {
            site: if over.site.is_empty() { base.site } else { over.site },
            author: if over.author.is_empty() {
                base.author
            } else {
                over.author
            },
            workflow: WorkflowSettings {
                default_approver: if over.workflow.default_approver.is_empty() {
                    base.workflow.default_approver
                } else {
                    over.workflow.default_approver
                },
                auto_archive: over.workflow.auto_archive,
            },
        }
    }

    /// Resolve the acting author name, with environment fallbacks
    pub fn author(&self) -> String {
        if !self.author.is_empty() {
            return self.author.clone();
        }
        std::env::var("FIT_AUTHOR")
            .or_else(|_| std::env::var("USER"))
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "Unknown".to_string())
    }
}
