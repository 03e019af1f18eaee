//! Process-wide scheduling onto the current frame loop.
//!
//! These functions forward to the dispatcher of whichever
//! [`FrameLoop`](crate::FrameLoop) last called
//! [`make_current`](crate::FrameLoop::make_current). With no current loop they
//! fail with [`ScheduleError::NoActiveContext`].

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use cinnamon_scripting_host::ScriptFunction;
use tracing::debug;

use crate::dispatcher::{Dispatcher, ScheduleError};
use crate::invocation::{self, TaskId};

static ACTIVE: RwLock<Option<Dispatcher>> = RwLock::new(None);

pub(crate) fn set_active(dispatcher: Dispatcher) {
    debug!(target: "cinnamon::dispatch", "Frame loop made current");
    *ACTIVE.write().unwrap_or_else(PoisonError::into_inner) = Some(dispatcher);
}

/// Clear the current loop, but only if it is the one `dispatcher` belongs to
pub(crate) fn clear_active(dispatcher: &Dispatcher) {
    let mut active = ACTIVE.write().unwrap_or_else(PoisonError::into_inner);
    if active.as_ref().is_some_and(|current| current.same_loop(dispatcher)) {
        *active = None;
    }
}

/// Dispatcher of the current frame loop, if there is one
pub fn active() -> Option<Dispatcher> {
    ACTIVE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .filter(|dispatcher| dispatcher.is_active())
        .cloned()
}

/// Id of the invocation currently running on this thread.
///
/// Only `Some` inside a deferred callable, whose state is
/// [`Invoked`](crate::InvocationState::Invoked) for exactly that span.
pub fn current_task() -> Option<TaskId> {
    invocation::running()
}

fn with_active<T>(
    f: impl FnOnce(&Dispatcher) -> Result<T, ScheduleError>,
) -> Result<T, ScheduleError> {
    let dispatcher = active().ok_or(ScheduleError::NoActiveContext)?;
    f(&dispatcher)
}

pub fn schedule<F>(f: F) -> Result<TaskId, ScheduleError>
where
    F: FnOnce() + Send + 'static,
{
    with_active(|dispatcher| dispatcher.schedule(f))
}

pub fn schedule_after<F>(f: F, delay: Duration) -> Result<TaskId, ScheduleError>
where
    F: FnOnce() + Send + 'static,
{
    with_active(|dispatcher| dispatcher.schedule_after(f, delay))
}

/// Delay in seconds. Negative or non-finite delays are rejected.
pub fn schedule_after_secs<F>(f: F, secs: f32) -> Result<TaskId, ScheduleError>
where
    F: FnOnce() + Send + 'static,
{
    with_active(|dispatcher| dispatcher.schedule_after_secs(f, secs))
}

pub fn try_schedule<F>(f: F) -> Result<TaskId, ScheduleError>
where
    F: FnOnce() -> anyhow::Result<()> + Send + 'static,
{
    with_active(|dispatcher| dispatcher.try_schedule(f))
}

pub fn schedule_script(function: ScriptFunction) -> Result<TaskId, ScheduleError> {
    with_active(|dispatcher| dispatcher.schedule_script(function))
}

pub fn schedule_script_after(
    function: ScriptFunction,
    delay: Duration,
) -> Result<TaskId, ScheduleError> {
    with_active(|dispatcher| dispatcher.schedule_script_after(function, delay))
}

pub fn schedule_script_file(path: impl Into<PathBuf>) -> Result<TaskId, ScheduleError> {
    let path = path.into();
    with_active(|dispatcher| dispatcher.schedule_script_file(path))
}
