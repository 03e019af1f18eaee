use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::logging::{log, LogLevel};

/// What happened inside [`run_with_exception_handler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Completed,
    /// The closure returned an error or panicked; carries the logged message
    Failed(String),
}

impl GuardOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, GuardOutcome::Completed)
    }
}

/// Run `f`, logging any error or panic it raises at ERROR and swallowing it.
///
/// Errors are logged as `Exception: <message>`. Panics with a string payload
/// are logged the same way, any other payload as `Unknown exception`.
pub fn run_with_exception_handler<F>(f: F) -> GuardOutcome
where
    F: FnOnce() -> anyhow::Result<()>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => GuardOutcome::Completed,
        Ok(Err(e)) => {
            let message = format!("{:#}", e);
            log(LogLevel::Error, format_args!("Exception: {}", message));
            GuardOutcome::Failed(message)
        }
        Err(payload) => match panic_message(payload.as_ref()) {
            Some(message) => {
                log(LogLevel::Error, format_args!("Exception: {}", message));
                GuardOutcome::Failed(message.to_string())
            }
            None => {
                log(LogLevel::Error, "Unknown exception");
                GuardOutcome::Failed("Unknown exception".to_string())
            }
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}
