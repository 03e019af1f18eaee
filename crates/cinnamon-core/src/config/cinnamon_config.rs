use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{
    frame_config::FrameConfig, logging_config::LoggingConfig, paths::ProjectPaths,
    scripting_config::ScriptingConfig,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Config file not found")]
    NotFound,
    #[error("Failed to parse config: {0}")]
    ParseError(String),
    #[error("IO error reading config: {0}")]
    IoError(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinnamonConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Scripting configuration
    #[serde(default)]
    pub scripting: ScriptingConfig,

    #[serde(default)]
    pub frame: FrameConfig,
}

impl CinnamonConfig {
    pub fn config_path() -> PathBuf {
        ProjectPaths::new("cinnamon")
            .map(|p| p.config_dir())
            .unwrap_or_else(|| PathBuf::from(".cinnamon"))
            .join("config.toml")
    }

    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::NotFound);
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigLoadError::IoError(e.to_string()))?;
        let config =
            toml::from_str(&content).map_err(|e| ConfigLoadError::ParseError(e.to_string()))?;
        info!(target: "cinnamon::config", "Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(&self)?;
        fs::write(path, content)?;
        info!(target: "cinnamon::config", "Saved config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = CinnamonConfig::load_from(&dir.path().join("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::NotFound));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "").unwrap();

        let config = CinnamonConfig::load_from(&path).unwrap();
        assert_eq!(config, CinnamonConfig::default());
        assert!(config.scripting.enabled);
        assert_eq!(config.scripting.entry_point, "_start");
        assert_eq!(config.frame.tick_rate_hz, 60);
    }

    #[test]
    fn test_parses_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[logging]
level = "warning"
file = true

[scripting]
enabled = false
script_dir = "/mods"
autorun = ["init.wasm"]

[frame]
tick_rate_hz = 30
"#,
        )
        .unwrap();

        let config = CinnamonConfig::load_from(&path).unwrap();
        assert_eq!(config.logging.level, LogLevel::Warning);
        assert!(config.logging.file);
        assert!(!config.logging.debug);
        assert!(!config.scripting.enabled);
        assert_eq!(config.scripting.script_dir, Some(PathBuf::from("/mods")));
        assert_eq!(config.scripting.autorun, vec![PathBuf::from("init.wasm")]);
        assert_eq!(config.frame.tick_rate_hz, 30);
    }

    #[test]
    fn test_bad_level_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[logging]\nlevel = \"LOUD\"\n").unwrap();

        let err = CinnamonConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigLoadError::ParseError(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CinnamonConfig::default();
        config.logging.level = LogLevel::Error;
        config.scripting.autorun.push(PathBuf::from("boot.wat"));
        config.save_to(&path).unwrap();

        let loaded = CinnamonConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
