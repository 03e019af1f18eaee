pub mod cinnamon_config;
pub mod frame_config;
pub mod logging_config;
pub mod paths;
pub mod scripting_config;

pub use cinnamon_config::{CinnamonConfig, ConfigLoadError};
pub use frame_config::FrameConfig;
pub use logging_config::LoggingConfig;
pub use paths::ProjectPaths;
pub use scripting_config::ScriptingConfig;
