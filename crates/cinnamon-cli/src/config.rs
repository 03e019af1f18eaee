use std::fs;
use std::path::Path;

use anyhow::Context;
use cinnamon_core::{CinnamonConfig, ConfigLoadError};

pub const EXAMPLE_CONFIG: &str = r#"# Cinnamon configuration

[logging]
# DEBUG | INFO | WARNING | ERROR | CRITICAL
level = "INFO"
debug = false
# Also write <data dir>/logs/cinnamon.log
file = false

[scripting]
enabled = true
# script_dir = "/path/to/scripts"
# Scripts run on the first frame, relative to script_dir
autorun = []
entry_point = "_start"

[frame]
tick_rate_hz = 60
"#;

/// Load the config at `path`, writing the example config there first if the
/// file doesn't exist yet.
pub fn load_or_create(path: &Path) -> anyhow::Result<CinnamonConfig> {
    match CinnamonConfig::load_from(path) {
        Ok(config) => Ok(config),
        Err(ConfigLoadError::NotFound) => {
            create_example_config(path)?;
            eprintln!("Config file created at: {}", path.display());
            Ok(CinnamonConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

fn create_example_config(path: &Path) -> anyhow::Result<()> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))
}
