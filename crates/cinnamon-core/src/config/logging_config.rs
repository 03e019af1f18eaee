use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum level printed by the sink
    #[serde(default)]
    pub level: LogLevel,

    /// Start in debug mode (forces the level to DEBUG)
    #[serde(default)]
    pub debug: bool,

    /// Also write logs to `<data_dir>/logs/cinnamon.log`
    #[serde(default)]
    pub file: bool,
}
