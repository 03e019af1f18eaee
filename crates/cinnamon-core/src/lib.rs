//! Shared plumbing for the cinnamon crates: TOML configuration, the console
//! logging sink and the error boundary wrapped around deferred work.

pub mod config;
pub mod guard;
pub mod logging;

pub use config::{CinnamonConfig, ConfigLoadError, ProjectPaths};
pub use guard::{run_with_exception_handler, GuardOutcome};
pub use logging::{
    enable_debug_mode, is_debug_mode, log, log_named, logging_level, set_logging_level,
    LogLevel, Logger,
};
