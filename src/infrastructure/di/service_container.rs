//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::application::services::{EditorOptions, MenuService};
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Menu persistence
    pub menu: MenuService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let menu = MenuService::new(fs);

        Self { settings, menu }
    }

    /// Editing options derived from the settings.
    pub fn editor_options(&self) -> EditorOptions {
        EditorOptions::from(self.settings.as_ref())
    }

    /// Menu file location; relative paths resolve against `project_dir`.
    pub fn menu_path(&self, project_dir: &Path, explicit: Option<&Path>) -> PathBuf {
        let path = explicit.unwrap_or(&self.settings.menu_file);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_dir.join(path)
        }
    }
}
