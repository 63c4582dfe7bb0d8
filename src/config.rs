//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/navmenu/navmenu.toml`
//! 3. Local config: `<project_dir>/.navmenu.toml`
//! 4. Environment variables: `NAVMENU_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, ItemDefaults, LinkTarget};

/// Raw new-item defaults for intermediate parsing (`None` → not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawItemDefaults {
    pub label: Option<String>,
    pub link: Option<String>,
    pub link_target: Option<LinkTarget>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub max_depth: Option<usize>,
    pub menu_file: Option<PathBuf>,
    pub history_limit: Option<usize>,
    pub defaults: RawItemDefaults,
}

/// Unified configuration for navmenu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Nesting levels allowed; entries at depth `max_depth - 1` take no children
    pub max_depth: usize,
    /// Menu file, relative to the project directory unless absolute
    pub menu_file: PathBuf,
    /// Undo steps kept by an editing session
    pub history_limit: usize,
    /// Field values of newly created entries
    pub defaults: ItemDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_depth: 3,
            menu_file: PathBuf::from("menu.json"),
            history_limit: 50,
            defaults: ItemDefaults::default(),
        }
    }
}

/// Get the XDG config directory for navmenu.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "navmenu").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("navmenu.toml"))
}

/// Get the path to the local config file of a project.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".navmenu.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.menu_file.to_string_lossy().as_ref());
        self.menu_file = PathBuf::from(expanded);
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            max_depth: overlay.max_depth.unwrap_or(self.max_depth),
            menu_file: overlay
                .menu_file
                .clone()
                .unwrap_or_else(|| self.menu_file.clone()),
            history_limit: overlay.history_limit.unwrap_or(self.history_limit),
            defaults: ItemDefaults {
                label: overlay
                    .defaults
                    .label
                    .clone()
                    .unwrap_or_else(|| self.defaults.label.clone()),
                link: overlay
                    .defaults
                    .link
                    .clone()
                    .unwrap_or_else(|| self.defaults.link.clone()),
                link_target: overlay
                    .defaults
                    .link_target
                    .unwrap_or(self.defaults.link_target),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Project-local config
        if let Some(project) = project_dir {
            let local_path = local_config_path(project);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply NAVMENU_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("NAVMENU")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("max_depth") {
            settings.max_depth = parse_number("NAVMENU_MAX_DEPTH", &val)?;
        }
        if let Ok(val) = config.get_string("menu_file") {
            settings.menu_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("history_limit") {
            settings.history_limit = parse_number("NAVMENU_HISTORY_LIMIT", &val)?;
        }
        if let Ok(val) = config.get_string("defaults.label") {
            settings.defaults.label = val;
        }
        if let Ok(val) = config.get_string("defaults.link") {
            settings.defaults.link = val;
        }
        if let Ok(val) = config.get_string("defaults.link_target") {
            settings.defaults.link_target = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("NAVMENU_DEFAULTS__LINK_TARGET: {e}"),
            })?;
        }

        Ok(settings)
    }

    /// Reject values the editor cannot work with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if self.max_depth == 0 {
            return Err(ApplicationError::Config {
                message: "max_depth must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# navmenu configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/navmenu/navmenu.toml
#   Local:  <project_dir>/.navmenu.toml
#   Env:    NAVMENU_* environment variables (NAVMENU_DEFAULTS__LABEL for nested keys)

# Nesting levels allowed; entries on the last level cannot take children
# max_depth = 3

# Menu file, relative to the project directory
# menu_file = "menu.json"

# Undo steps kept while editing
# history_limit = 50

[defaults]
# Values given to newly created entries
# label = "New Item"
# link = "/"
# link_target = "same-window"   # or "new-window"
"#
        .to_string()
    }
}

fn parse_number(key: &str, value: &str) -> Result<usize, ApplicationError> {
    value.trim().parse().map_err(|e| ApplicationError::Config {
        message: format!("{key}: {value:?}: {e}"),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
