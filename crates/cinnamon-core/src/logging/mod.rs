//! Console logging sink.
//!
//! Every message goes out as a `tracing` event on [`SINK_TARGET`] after being
//! checked against a process-wide minimum level. [`CinnamonFormat`] renders
//! those events as `CINNAMON: <LEVEL> >> <message>` lines.

mod format;
mod init;
mod level;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

pub use format::CinnamonFormat;
pub use init::init_logging;
pub use level::{LevelParseError, LogLevel};

/// Tag printed at the start of every console line
pub const TAG: &str = "CINNAMON";

/// Target used for events emitted through the sink
pub const SINK_TARGET: &str = "cinnamon::sink";

static LOGGER: Logger = Logger::new(LogLevel::Info);
static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

/// Level-filtered front end of the sink.
///
/// The process uses a single global instance (see [`log`]); separate instances
/// are useful when a component wants its own threshold.
#[derive(Debug)]
pub struct Logger {
    min_level: AtomicU8,
}

impl Logger {
    pub const fn new(min_level: LogLevel) -> Self {
        Self {
            min_level: AtomicU8::new(min_level as u8),
        }
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_index(self.min_level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.min_level.store(level.index(), Ordering::Relaxed);
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level()
    }

    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        if self.enabled(level) {
            emit(level, &message);
        }
    }

    /// Log with the level given by name. Unrecognised names are logged at INFO.
    pub fn log_named(&self, level_name: &str, message: impl fmt::Display) {
        let level = level_name.parse().unwrap_or(LogLevel::Info);
        self.log(level, message);
    }
}

fn emit(level: LogLevel, message: &dyn fmt::Display) {
    let severity = level.as_str();
    match level {
        LogLevel::Debug => {
            tracing::event!(target: SINK_TARGET, tracing::Level::DEBUG, severity = severity, "{}", message)
        }
        LogLevel::Info => {
            tracing::event!(target: SINK_TARGET, tracing::Level::INFO, severity = severity, "{}", message)
        }
        LogLevel::Warning => {
            tracing::event!(target: SINK_TARGET, tracing::Level::WARN, severity = severity, "{}", message)
        }
        LogLevel::Error | LogLevel::Critical => {
            tracing::event!(target: SINK_TARGET, tracing::Level::ERROR, severity = severity, "{}", message)
        }
    }
}

/// The process-wide logger
pub fn logger() -> &'static Logger {
    &LOGGER
}

pub fn log(level: LogLevel, message: impl fmt::Display) {
    LOGGER.log(level, message);
}

pub fn log_named(level_name: &str, message: impl fmt::Display) {
    LOGGER.log_named(level_name, message);
}

pub fn set_logging_level(level: LogLevel) {
    LOGGER.set_level(level);
}

pub fn logging_level() -> LogLevel {
    LOGGER.level()
}

/// Switch the process into debug mode: lowers the sink threshold to DEBUG.
pub fn enable_debug_mode() {
    DEBUG_MODE.store(true, Ordering::Relaxed);
    set_logging_level(LogLevel::Debug);
    log(LogLevel::Debug, "Debug mode enabled");
}

pub fn is_debug_mode() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::CinnamonFormat;

    /// In-memory writer shared between a test and its scoped subscriber
    #[derive(Clone, Default)]
    pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

    impl CapturedOutput {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` with a subscriber that formats like the console and return what it printed
    pub fn capture<F: FnOnce()>(f: F) -> String {
        let output = CapturedOutput::default();
        let writer = output.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .event_format(CinnamonFormat::default())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        output.contents()
    }
}
