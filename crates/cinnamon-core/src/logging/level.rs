use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, IntoStaticStr};

/// Severity accepted by the logging sink, ordered from least to most severe.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warning = 2,
    Error = 3,
    Critical = 4,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// Upper-case name printed in console lines (`"WARNING"`, `"CRITICAL"`, ...)
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Nearest tracing level. CRITICAL has no tracing counterpart and maps to ERROR.
    pub fn to_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warning => tracing::Level::WARN,
            LogLevel::Error | LogLevel::Critical => tracing::Level::ERROR,
        }
    }

    pub fn from_tracing(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE | tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warning,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }

    /// `EnvFilter` directive matching this level
    pub fn filter_directive(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown logging level '{0}'")]
pub struct LevelParseError(pub String);

impl FromStr for LogLevel {
    type Err = LevelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(LevelParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = LevelParseError;

    fn try_from(value: String) -> Result<Self, LevelParseError> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered_by_severity() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Critical);
    }

    #[test]
    fn test_display_uses_upper_case_names() {
        assert_eq!(LogLevel::Warning.to_string(), "WARNING");
        assert_eq!(LogLevel::Critical.as_str(), "CRITICAL");
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!(" Warn ".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("CRITICAL".parse::<LogLevel>(), Ok(LogLevel::Critical));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_try_from_string() {
        assert_eq!(LogLevel::try_from("error".to_string()), Ok(LogLevel::Error));
        assert_eq!(
            LogLevel::try_from("loud".to_string()),
            Err(LevelParseError("loud".to_string()))
        );
        assert_eq!(String::from(LogLevel::Error), "ERROR");
    }

    #[test]
    fn test_index_round_trip_and_bounds() {
        for level in LogLevel::ALL {
            assert_eq!(LogLevel::from_index(level.index()), Some(level));
        }
        assert_eq!(LogLevel::from_index(5), None);
    }

    #[test]
    fn test_critical_maps_to_tracing_error() {
        assert_eq!(LogLevel::Critical.to_tracing(), tracing::Level::ERROR);
        assert_eq!(LogLevel::from_tracing(&tracing::Level::TRACE), LogLevel::Debug);
    }
}
