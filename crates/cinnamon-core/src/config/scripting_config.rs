use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::paths::ProjectPaths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptingConfig {
    /// Whether scripting is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Directory containing scripts (default: <data_dir>/scripts)
    #[serde(default)]
    pub script_dir: Option<PathBuf>,

    /// Script files scheduled on the main thread at start-up and on reload
    #[serde(default)]
    pub autorun: Vec<PathBuf>,

    /// Export called when a script file is run
    #[serde(default = "default_entry_point")]
    pub entry_point: String,

    /// Host directory pre-opened for scripts as `/script_data`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

fn default_entry_point() -> String {
    "_start".to_string()
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            script_dir: None,
            autorun: Vec::new(),
            entry_point: default_entry_point(),
            data_dir: None,
        }
    }
}

impl ScriptingConfig {
    /// Get the script directory path (use provided or default)
    pub fn script_dir(&self) -> PathBuf {
        self.script_dir.clone().unwrap_or_else(|| {
            ProjectPaths::new("cinnamon")
                .map(|p| p.data_dir().join("scripts"))
                .unwrap_or_else(|| PathBuf::from(".scripts"))
        })
    }

    /// Resolve a script path; relative paths are taken from the script directory
    pub fn resolve_script(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.script_dir().join(path)
        }
    }

    /// Autorun entries resolved against the script directory
    pub fn autorun_paths(&self) -> Vec<PathBuf> {
        self.autorun
            .iter()
            .map(|path| self.resolve_script(path))
            .collect()
    }
}
